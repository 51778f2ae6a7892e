//! C4/C5 — Template Evaluator and Fragment Resolver (§4.4, §4.5).
//!
//! minijinja is the host templating language (general `{{ }}` / `{% %}`
//! constructs are entirely its own); the `@slug(...)` reference operator is
//! layered on top by [`crate::parser`] rewriting each occurrence into a call
//! of one reserved native function, `__prompy_ref`, registered on the
//! environment below. A second reserved function, `__prompy_var`, wraps
//! bareword argument values purely so a failed lookup can be reported with
//! the identifier's name (minijinja's `Undefined` values don't carry one
//! through a function call boundary).

use crate::error::Error;
use crate::loader::{ArgTable, Loader};
use minijinja::value::{Kwargs, Rest};
use minijinja::{Environment, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// One entry in the resolution stack (§3 "Resolution frame", §4.5).
struct Frame {
    slug: String,
    file: Option<PathBuf>,
    /// Caller-site line the frame was entered from, for diagnostics.
    line: usize,
    scope: HashMap<String, String>,
}

struct ResolverState {
    roots: Vec<PathBuf>,
    project: String,
    language: String,
    loader: Loader,
    stack: Vec<Frame>,
    /// First structured [`Error`] raised inside a native function call.
    /// minijinja's own `Error` type can't carry our variants across the
    /// callback boundary, so we stash the real error here and return a
    /// throwaway `minijinja::Error` to unwind the render.
    first_error: Option<Error>,
}

/// Evaluates fragment bodies, resolving `@slug(...)` references depth-first
/// as minijinja encounters the rewritten `__prompy_ref` calls (§4.4, §4.5).
///
/// Each render builds its own local `minijinja::Environment` around the
/// freshly rewritten source text (the text is only known once a fragment is
/// loaded, so it can never outlive a fixed, pre-built environment); the
/// shared [`ResolverState`] is what actually carries state across nested
/// `@`-reference calls within one render.
pub struct FragmentEngine {
    state: Rc<RefCell<ResolverState>>,
}

impl FragmentEngine {
    pub fn new(project: String, language: String, roots: Vec<PathBuf>) -> Self {
        let state = Rc::new(RefCell::new(ResolverState {
            roots,
            project,
            language,
            loader: Loader::new(),
            stack: Vec::new(),
            first_error: None,
        }));
        Self { state }
    }

    /// Render `body` as the top-level document (§4.4 "Entry point"),
    /// starting with `scope` as the initial variable bindings and
    /// `caller_file` identifying the file `body` came from (`None` for a
    /// body passed in directly as a string).
    pub fn render(
        &self,
        body: &str,
        scope: HashMap<String, String>,
        caller_file: Option<PathBuf>,
    ) -> Result<String, Error> {
        self.state.borrow_mut().stack.push(Frame {
            slug: "<top>".to_string(),
            file: caller_file.clone(),
            line: 0,
            scope: scope.clone(),
        });
        let result = evaluate(&self.state, body, &scope, caller_file.as_deref());
        self.state.borrow_mut().stack.pop();
        result
    }
}

/// Implements §4.5's resolve-reference algorithm: locate, cycle-check, load,
/// bind the callee's argument scope, push a frame, evaluate the callee's
/// body, pop the frame.
fn resolve_reference(
    state: &Rc<RefCell<ResolverState>>,
    line: usize,
    slug: &str,
    positional: Vec<Value>,
    kwargs: Kwargs,
) -> Result<String, Error> {
    crate::slug::validate(slug)?;

    let (caller_file, roots, project, language) = {
        let st = state.borrow();
        let caller_file = st.stack.last().and_then(|f| f.file.clone());
        (caller_file, st.roots.clone(), st.project.clone(), st.language.clone())
    };

    let path = match crate::slug::resolve(slug, &project, &language, &roots) {
        Ok(path) => path,
        Err(searched) => {
            return Err(Error::MissingFragment {
                slug: slug.to_string(),
                caller_file,
                caller_line: line,
                searched,
            });
        }
    };

    {
        let st = state.borrow();
        if st.stack.iter().any(|f| f.slug == slug) {
            let mut chain: Vec<String> = st.stack.iter().map(|f| f.slug.clone()).collect();
            chain.push(slug.to_string());
            let paths: Vec<PathBuf> = st
                .stack
                .iter()
                .skip(1)
                .filter_map(|f| f.file.clone())
                .collect();
            let top_file = st.stack.first().and_then(|f| f.file.clone());
            return Err(Error::Cycle {
                chain,
                top_file,
                paths,
                origin_line: line,
            });
        }
    }

    let fragment = state.borrow_mut().loader.load(&path, slug)?;

    let new_scope = bind_argument_scope(
        &fragment.args,
        positional,
        kwargs,
        slug,
        &caller_file,
        line,
    )?;

    tracing::debug!(slug, file = %path.display(), line, "entering fragment frame");
    state.borrow_mut().stack.push(Frame {
        slug: slug.to_string(),
        file: Some(path.clone()),
        line,
        scope: new_scope.clone(),
    });

    let rendered = evaluate(state, &fragment.body, &new_scope, Some(&path));

    state.borrow_mut().stack.pop();
    tracing::debug!(slug, "leaving fragment frame");
    rendered
}

/// Bind a callee fragment's declared arguments against the positional and
/// keyword values it was called with (§4.5 step 4): positional args fill
/// declared names left to right, keyword args fill (or override) by name,
/// remaining declared names fall back to their default or raise
/// [`Error::MissingArgument`], and unknown keyword names are passed through
/// into the callee's scope unchanged.
fn bind_argument_scope(
    declared: &ArgTable,
    positional: Vec<Value>,
    kwargs: Kwargs,
    slug: &str,
    caller_file: &Option<PathBuf>,
    line: usize,
) -> Result<HashMap<String, String>, Error> {
    if positional.len() > declared.len() {
        return Err(Error::TooManyArguments {
            slug: slug.to_string(),
            caller_file: caller_file.clone(),
            caller_line: line,
        });
    }

    let mut scope = HashMap::new();
    let mut bound: Vec<String> = Vec::new();

    for (value, (name, _default)) in positional.into_iter().zip(declared.iter()) {
        scope.insert(name.clone(), value_to_string(value));
        bound.push(name.clone());
    }

    for key in kwargs.args() {
        let value: Value = kwargs.get(key).unwrap_or(Value::UNDEFINED);
        scope.insert(key.to_string(), value_to_string(value));
        bound.push(key.to_string());
    }
    // Every key was consumed above (unknown keywords pass through by
    // design, §9), so this never actually reports unused arguments.
    let _ = kwargs.assert_all_used();

    for (name, default) in declared.iter() {
        if bound.iter().any(|b| b == name) {
            continue;
        }
        match default {
            Some(value) => {
                scope.insert(name.clone(), value.clone());
            }
            None => {
                return Err(Error::MissingArgument {
                    name: name.clone(),
                    slug: slug.to_string(),
                    caller_file: caller_file.clone(),
                    caller_line: line,
                });
            }
        }
    }

    Ok(scope)
}

fn value_to_string(value: Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// Rewrite `body`'s `@`-references and render it in a fresh, local
/// minijinja environment (one per call: the rewritten source is only known
/// once a fragment is loaded, so it can't be pinned to a longer-lived
/// environment). The two reserved native functions are registered here,
/// closing over clones of the same shared `state` so nested fragments keep
/// resolving against the same stack and cache.
fn evaluate(
    state: &Rc<RefCell<ResolverState>>,
    body: &str,
    scope: &HashMap<String, String>,
    file: Option<&Path>,
) -> Result<String, Error> {
    let rewritten = crate::parser::rewrite_for_minijinja(body, file)?;

    let mut env = Environment::new();
    register_functions(&mut env, state);

    let template = env
        .template_from_str(&rewritten)
        .map_err(|e| mj_syntax_error(e, file))?;
    let ctx = Value::from_serializable(scope);

    match template.render(ctx) {
        Ok(rendered) => Ok(rendered),
        Err(mj_err) => {
            if let Some(error) = state.borrow_mut().first_error.take() {
                Err(error)
            } else {
                Err(mj_syntax_error(mj_err, file))
            }
        }
    }
}

/// Register the two reserved native functions on `env`, each closing over a
/// clone of the shared resolver state.
fn register_functions(env: &mut Environment<'_>, state: &Rc<RefCell<ResolverState>>) {
    let ref_state = state.clone();
    env.add_function(
        "__prompy_ref",
        move |line: i64, slug: String, rest: Rest<Value>, kwargs: Kwargs| -> Result<Value, minijinja::Error> {
            let result = resolve_reference(&ref_state, line as usize, &slug, rest.0, kwargs)
                .map(Value::from);
            unwrap_or_abort(&ref_state, result)
        },
    );

    let var_state = state.clone();
    env.add_function(
        "__prompy_var",
        move |line: i64, name: String, value: Value| -> Result<Value, minijinja::Error> {
            let result = if value.is_undefined() {
                let caller_file = var_state.borrow().stack.last().and_then(|f| f.file.clone());
                Err(Error::UnboundVariable {
                    name,
                    caller_file,
                    caller_line: line as usize,
                })
            } else {
                Ok(value)
            };
            unwrap_or_abort(&var_state, result)
        },
    );
}

fn unwrap_or_abort<T>(
    state: &Rc<RefCell<ResolverState>>,
    result: Result<T, Error>,
) -> Result<T, minijinja::Error> {
    match result {
        Ok(value) => Ok(value),
        Err(error) => {
            state.borrow_mut().first_error = Some(error);
            Err(minijinja::Error::new(
                minijinja::ErrorKind::InvalidOperation,
                "fragment resolution failed",
            ))
        }
    }
}

fn mj_syntax_error(err: minijinja::Error, file: Option<&Path>) -> Error {
    Error::Syntax {
        file: file.map(Path::to_path_buf),
        line: err.line().unwrap_or(0),
        column: 0,
        detail: err.to_string(),
        snippet: String::new(),
    }
}
