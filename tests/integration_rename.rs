//! Rename refactorer scenario and round-trip property (spec.md §8 S6, P5).

use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

/// S6 — Rename updates references, preserving everything else byte-for-byte.
#[test]
fn s6_rename_updates_references() {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "fragments/caller.md",
        r#"See {{ @old/name(x="1") }}."#,
    );

    let roots = vec![dir.path().to_path_buf()];
    prompy::move_fragment("old/name", "new/home/name", &roots).unwrap();

    assert_eq!(
        read(dir.path(), "fragments/caller.md"),
        r#"See {{ @new/home/name(x="1") }}."#
    );
}

/// P5 — Rename round-trip: renaming away and back restores the tree.
#[test]
fn p5_rename_round_trip_restores_the_tree() {
    let dir = tempdir().unwrap();
    let original = indoc::indoc! {r#"
        Intro.
        {{ @a() }}
        See also @a() for detail.
        Outro.
    "#};
    write(dir.path(), "fragments/caller.md", original);

    let roots = vec![dir.path().to_path_buf()];
    prompy::move_fragment("a", "b", &roots).unwrap();
    assert_ne!(read(dir.path(), "fragments/caller.md"), original);

    prompy::move_fragment("b", "a", &roots).unwrap();
    assert_eq!(read(dir.path(), "fragments/caller.md"), original);
}
