// Integration tests for the module graph
//
// Projects over in-memory and on-disk sources: tiered output, interop
// blocks, incremental rebuilds and cross-file composition.

use std::fs;
use std::path::{Path, PathBuf};

use cascade_diagnostic::ErrorCode;
use cascade_graph::{MemoryLoader, Naming, OutputOptions, Project, ProjectConfig};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn memory_project(files: &[(&str, &str)]) -> (Project, MemoryLoader) {
    cascade_graph::init_tracing();
    let loader = MemoryLoader::new();
    for (path, source) in files {
        loader.insert(Path::new("/site").join(path), *source);
    }
    let config = ProjectConfig::new().root("/site").naming(Naming::Verbatim);
    let project = Project::builder(config).loader(loader.clone()).build();
    (project, loader)
}

#[tokio::test]
async fn test_output_is_tiered_with_markers() {
    let (project, _) = memory_project(&[
        ("button.cas", ".button { @compose base from \"./base\"; padding: 0; }"),
        ("base.cas", ".base { color: red; }"),
    ]);
    project.add("button.cas", None).await.unwrap();
    assert_eq!(
        project.output(&OutputOptions::new()),
        "/* base.cas */\n.base {\n  color: red;\n}\n\n/* button.cas */\n.button {\n  padding: 0;\n}\n"
    );
    let button = project.exports("button.cas").unwrap();
    let class = button
        .get(cascade_eval::MemberTag::Class, "button")
        .and_then(cascade_eval::Member::as_class)
        .unwrap();
    assert_eq!(class.to_value().to_css(), "button base");
}

#[tokio::test]
async fn test_interop_blocks() {
    let (project, _) = memory_project(&[
        ("tokens.cas", "$gap: 4px;\n@export $gap;"),
        ("card.cas", "@use \"./tokens\";\n.card { margin: tokens.$gap; }"),
    ]);
    project.add("card.cas", None).await.unwrap();
    assert_eq!(
        project.interop("card.cas").unwrap(),
        ":import(\"./tokens\") {}\n\n:export {\n  card: card;\n}\n"
    );
    assert_eq!(project.interop("tokens.cas").unwrap(), ":export {\n  $gap: 4px;\n}\n");

    let output = project.output(&OutputOptions::new().files(["card.cas"]).interop(true));
    assert_eq!(
        output,
        "/* tokens.cas */\n:export {\n  $gap: 4px;\n}\n\n\
         /* card.cas */\n:import(\"./tokens\") {}\n\n:export {\n  card: card;\n}\n\n.card {\n  margin: 4px;\n}\n"
    );
}

#[tokio::test]
async fn test_selected_output_skips_unrelated_files() {
    let (project, _) = memory_project(&[
        ("a.cas", "@use \"./shared\";\n.a { x: 1; }"),
        ("b.cas", ".b { y: 2; }"),
        ("shared.cas", ".shared { z: 3; }"),
    ]);
    project.add("a.cas", None).await.unwrap();
    project.add("b.cas", None).await.unwrap();
    let output = project.output(&OutputOptions::new().files(["a.cas"]));
    assert!(output.contains("/* shared.cas */"));
    assert!(output.contains("/* a.cas */"));
    assert!(!output.contains("/* b.cas */"));
    assert!(output.find("shared.cas") < output.find("a.cas"));
}

#[tokio::test]
async fn test_edit_rebuilds_only_the_stale_chain() {
    let (project, loader) = memory_project(&[
        ("app.cas", "@use \"./theme\";\n.app { color: theme.$fg; }"),
        ("theme.cas", "@use \"./palette\";\n$fg: palette.$red;\n@export $fg;"),
        ("palette.cas", "$red: #f00; @export $red;"),
        ("other.cas", ".other { a: b; }"),
    ]);
    project.add("app.cas", None).await.unwrap();
    project.add("other.cas", None).await.unwrap();
    let before = project.stats();
    assert_eq!(before.evaluations, 4);

    loader.insert("/site/palette.cas", "$red: #c00; @export $red;");
    let stale = project.invalidate("palette.cas");
    assert_eq!(
        stale,
        vec![
            PathBuf::from("/site/app.cas"),
            PathBuf::from("/site/palette.cas"),
            PathBuf::from("/site/theme.cas"),
        ]
    );
    assert!(project.is_valid("other.cas"));

    project.add("app.cas", None).await.unwrap();
    assert_eq!(project.stats().evaluations, before.evaluations + 3);
    assert_eq!(project.css("app.cas").unwrap(), ".app {\n  color: #c00;\n}\n");
}

#[tokio::test]
async fn test_failed_file_contributes_no_css() {
    let (project, _) = memory_project(&[
        ("good.cas", ".good { a: b; }"),
        ("bad.cas", ".bad { a: $missing; }"),
    ]);
    project.add("good.cas", None).await.unwrap();
    let err = project.add("bad.cas", None).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::UndefinedVariable);
    assert_eq!(err.file(), Some(Path::new("/site/bad.cas")));
    let output = project.output(&OutputOptions::new());
    assert_eq!(output, "/* good.cas */\n.good {\n  a: b;\n}\n");
}

#[tokio::test]
async fn test_css_files_are_global() {
    let loader = MemoryLoader::new()
        .with("/site/reset.css", ".reset { margin: 0; }")
        .with("/site/page.cas", "@use \"./reset.css\";\n.page { a: b; }");
    let config = ProjectConfig::new().root("/site").naming(Naming::Stem);
    let project = Project::builder(config).loader(loader).build();
    project.add("page.cas", None).await.unwrap();
    assert_eq!(project.css("reset.css").unwrap(), ".reset {\n  margin: 0;\n}\n");
    assert_eq!(project.css("page.cas").unwrap(), ".page_page {\n  a: b;\n}\n");
}

#[tokio::test]
async fn test_filesystem_project() {
    cascade_graph::init_tracing();
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("components")).unwrap();
    fs::write(root.join("vars.cas"), "$pad: 2px; @export $pad;").unwrap();
    fs::write(
        root.join("components/box.cas"),
        "@use \"../vars\";\n.box { padding: vars.$pad * 2; }",
    )
    .unwrap();

    let config = ProjectConfig::new().root(root).naming(Naming::Verbatim);
    let project = Project::new(config);
    project.add("components/box.cas", None).await.unwrap();
    assert_eq!(project.css("components/box.cas").unwrap(), ".box {\n  padding: 4px;\n}\n");
    assert_eq!(project.imports("components/box.cas"), vec![root.join("vars.cas")]);

    let err = project.add("components/missing.cas", None).await.unwrap_err();
    assert_eq!(err.file(), Some(root.join("components/missing.cas").as_path()));
}
