use super::*;
use std::path::PathBuf;
use tempfile::TempDir;

const APP_JSON: &str = r#"{
  "pages": ["pages/index/index"],
  "lazyCodeLoading": "requiredComponents",
  "usingComponents": { "nav-bar": "/components/nav-bar/nav-bar" },
  "subpackages": [{ "root": "shop", "pages": ["list/list"] }]
}"#;

struct Package {
    _tmp: TempDir,
    config: BuildConfig,
}

impl Package {
    /// A small package: one page, two components, one subpackage page.
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("app");
        fs::create_dir_all(&src).unwrap();
        let mut config = BuildConfig::for_dirs(&src, tmp.path().join("dist")).unwrap();
        config.quiet = true;

        let package = Self { _tmp: tmp, config };
        package.write("app.json", APP_JSON);
        package.write("app.js", "App({});");
        package.write("app.wxss", "page { color: #333; }");

        package.write(
            "pages/index/index.js",
            "const util = require('../../utils/util');\nPage({});",
        );
        package.write(
            "pages/index/index.json",
            r#"{"usingComponents": {"card": "/components/card/card"}}"#,
        );
        package.write(
            "pages/index/index.wxml",
            "<nav-bar/>\n<card/>\n<image src=\"/images/logo.png\"/>",
        );
        package.write("pages/index/index.wxss", ".card { color: red; }");
        package.write("utils/util.js", "module.exports = {};");

        for name in ["nav-bar", "card"] {
            package.write(&format!("components/{name}/{name}.js"), "Component({});");
            package.write(&format!("components/{name}/{name}.json"), r#"{"component": true}"#);
            package.write(&format!("components/{name}/{name}.wxml"), "<view>c</view>");
        }

        package.write("shop/list/list.js", "Page({});");
        package.write("shop/list/list.json", "{}");
        package.write("shop/list/list.wxml", "<view>list</view>");

        package.write("images/logo.png", "png");
        package.write("images/unused.png", "png");
        package.write("orphan/orphan.js", "Page({});");
        package
    }

    fn write(&self, rel: &str, content: &str) -> PathBuf {
        let path = self.config.dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    fn out(&self, rel: &str) -> PathBuf {
        self.config.dist.join(rel)
    }

    fn build(&self) -> BuildReport {
        build(&self.config).unwrap()
    }
}

#[test]
fn test_build_mirrors_reachable_files() {
    let pkg = Package::new();
    let report = pkg.build();

    for rel in [
        "app.json",
        "app.js",
        "app.wxss",
        "pages/index/index.js",
        "pages/index/index.json",
        "pages/index/index.wxml",
        "pages/index/index.wxss",
        "utils/util.js",
        "components/card/card.wxml",
        "components/nav-bar/nav-bar.json",
        "shop/list/list.wxml",
    ] {
        assert!(pkg.out(rel).exists(), "{rel} not emitted");
    }
    assert!(!pkg.out("orphan/orphan.js").exists());
    assert_eq!(report.errors(), 0, "{:?}", report.diagnostics.entries());
}

#[test]
fn test_referenced_asset_copied_and_unreferenced_reported() {
    let pkg = Package::new();
    let report = pkg.build();

    assert!(pkg.out("images/logo.png").exists());
    assert!(!pkg.out("images/unused.png").exists());

    let unused: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::UnusedAsset)
        .collect();
    assert_eq!(unused.len(), 1);
    assert_eq!(unused[0].file, PathBuf::from("images/unused.png"));
    assert_eq!(report.stats.assets_copied, 1);
}

#[test]
fn test_missing_lazy_code_loading_reported_once() {
    let pkg = Package::new();
    pkg.write("app.json", r#"{"pages": ["pages/index/index"]}"#);
    let report = pkg.build();

    assert_eq!(report.diagnostics.count(DiagnosticKind::LazyCodeLoading), 1);
}

#[test]
fn test_declared_but_unused_page_component() {
    let pkg = Package::new();
    pkg.write(
        "pages/index/index.json",
        r#"{"usingComponents": {"card": "/components/card/card", "foo": "/components/card/card"}}"#,
    );
    let report = pkg.build();

    let unused: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::UnusedComponent)
        .collect();
    assert_eq!(unused.len(), 1);
    assert!(unused[0].message.contains("foo"));
    assert_eq!(unused[0].file, PathBuf::from("pages/index/index.wxml"));
}

#[test]
fn test_root_component_used_from_subpackage() {
    let pkg = Package::new();
    pkg.write("pages/index/index.wxml", "<card/>\n<image src=\"/images/logo.png\"/>");
    pkg.write("shop/list/list.wxml", "<nav-bar/>");
    let report = pkg.build();

    let misplaced: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::MisplacedComponent)
        .collect();
    assert_eq!(misplaced.len(), 1);
    assert_eq!(misplaced[0].file, PathBuf::from("shop/list/list.wxml"));
    // Consumed by the subpackage use, so not reported as unused too.
    assert_eq!(report.diagnostics.count(DiagnosticKind::UnusedComponent), 0);
}

#[test]
fn test_unused_root_component() {
    let pkg = Package::new();
    pkg.write("pages/index/index.wxml", "<card/>\n<image src=\"/images/logo.png\"/>");
    let report = pkg.build();

    let unused: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::UnusedComponent)
        .collect();
    assert_eq!(unused.len(), 1);
    assert!(unused[0].message.contains("nav-bar"));
    assert_eq!(unused[0].file, PathBuf::from("app.json"));
}

#[test]
fn test_unconfigured_style_is_byte_identical() {
    let pkg = Package::new();
    let style = "/* layout */\n.card  >  .title,view{ margin : 0 10rpx ;}\n@media (min-width: 400px) { .card { padding: 4px } }\n";
    pkg.write("pages/index/index.wxss", style);
    pkg.build();

    assert_eq!(
        fs::read_to_string(pkg.out("pages/index/index.wxss")).unwrap(),
        style
    );
}

#[test]
fn test_unresolved_require_reported_once() {
    let pkg = Package::new();
    fs::remove_file(pkg.config.dir.join("utils/util.js")).unwrap();
    let report = pkg.build();

    assert_eq!(report.diagnostics.count(DiagnosticKind::UnresolvedModule), 1);
    assert!(pkg.out("pages/index/index.js").exists());
}

#[test]
fn test_shared_file_compiled_once() {
    let pkg = Package::new();
    pkg.write(
        "shop/list/list.js",
        "const util = require('../../utils/util');\nPage({});",
    );
    let report = pkg.build();

    assert_eq!(report.diagnostics.count(DiagnosticKind::UnresolvedModule), 0);
    let again = pkg.build();
    assert_eq!(again.stats.written, report.stats.written);
    assert_eq!(again.compiled, report.compiled);
}

#[test]
fn test_rebuild_clears_stale_output() {
    let pkg = Package::new();
    pkg.build();
    fs::write(pkg.out("stale.txt"), "old").unwrap();

    pkg.build();
    assert!(!pkg.out("stale.txt").exists());
    assert!(pkg.out("app.json").exists());
}

#[test]
fn test_sitemap_seeded_when_present() {
    let pkg = Package::new();
    pkg.build();
    assert!(!pkg.out("sitemap.json").exists());

    pkg.write("sitemap.json", r#"{"rules": [{"action": "allow", "page": "*"}]}"#);
    pkg.build();
    assert!(pkg.out("sitemap.json").exists());
}

#[test]
fn test_unresolved_page_reported() {
    let pkg = Package::new();
    pkg.write(
        "app.json",
        r#"{"pages": ["pages/index/index", "pages/gone/gone"], "lazyCodeLoading": "requiredComponents"}"#,
    );
    let report = pkg.build();

    let unresolved: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::UnresolvedPath)
        .collect();
    assert_eq!(unresolved.len(), 1);
    assert!(unresolved[0].message.contains("pages/gone/gone"));
}

#[test]
fn test_nested_output_directory_not_scanned() {
    let pkg = Package::new();
    let mut config = pkg.config.clone();
    config.dist = config.dir.join("dist");
    fs::create_dir_all(&config.dist).unwrap();
    fs::write(config.dist.join("leftover.png"), "png").unwrap();

    let report = build(&config).unwrap();
    let unused: Vec<_> = report
        .diagnostics
        .of_kind(DiagnosticKind::UnusedAsset)
        .map(|d| d.file.clone())
        .collect();
    assert_eq!(unused, vec![PathBuf::from("images/unused.png")]);
    assert!(config.dist.join("images/logo.png").exists());
}

#[test]
fn test_reference_above_root_leaves_source_alone() {
    let mut pkg = Package::new();
    pkg.config.js.wx_key = "uni".into();
    let shared = pkg._tmp.path().join("shared");
    fs::create_dir_all(&shared).unwrap();
    fs::write(shared.join("util.js"), "uni.showToast({});").unwrap();
    fs::write(shared.join("fmt.wxs"), "module.exports = {};").unwrap();

    pkg.write("app.js", "const util = require('../shared/util');\nApp({});");
    pkg.write(
        "pages/index/index.wxml",
        "<wxs src=\"../../../shared/fmt.wxs\" module=\"fmt\"/>\n<nav-bar/>\n<card/>\n<image src=\"/images/logo.png\"/>",
    );
    let report = pkg.build();

    assert_eq!(report.diagnostics.count(DiagnosticKind::OutsideRoot), 2);
    assert_eq!(
        fs::read_to_string(shared.join("util.js")).unwrap(),
        "uni.showToast({});"
    );
    assert_eq!(
        fs::read_to_string(shared.join("fmt.wxs")).unwrap(),
        "module.exports = {};"
    );
    assert!(pkg.out("app.js").exists());
}
