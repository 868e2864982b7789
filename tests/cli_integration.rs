use serde_json::Value;
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(name: &str) -> std::path::PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "class_packages_it_{}_{}_{}",
        std::process::id(),
        nanos,
        name
    ))
}

fn write_file(path: &std::path::Path, content: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}

fn write_jar(path: &std::path::Path, entries: &[&str]) -> anyhow::Result<()> {
    use std::io::Write;
    use zip::write::FileOptions;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::File::create(path)?;
    let mut zip = zip::ZipWriter::new(file);
    let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for name in entries {
        zip.start_file(*name, options)?;
        zip.write_all(b"")?;
    }
    zip.finish()?;
    Ok(())
}

fn run(args: &[&str]) -> anyhow::Result<Output> {
    let bin = env!("CARGO_BIN_EXE_class-packages");
    Ok(Command::new(bin)
        .args(args)
        .env_remove("CLASS_PACKAGES_UNIVERSE")
        .env_remove("RUST_LOG")
        .output()?)
}

fn run_json(args: &[&str]) -> anyhow::Result<Value> {
    let out = run(args)?;
    if !out.status.success() {
        return Err(anyhow::anyhow!(
            "command failed: status={:?}, stderr={}",
            out.status.code(),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(serde_json::from_slice(&out.stdout)?)
}

const MANIFEST: &str = r#"{
    "description": "shop",
    "classes": [
        { "name": "a.b.Foo", "modifiers": ["public"] },
        { "name": "a.b.c.Bar", "modifiers": ["public"] },
        { "name": "a.b.d.Baz" },
        { "name": "a.Other" },
        { "name": "a.b.c.package-info",
          "annotations": [ { "type": "x.Owner", "attributes": { "value": "catalog" } } ] },
        { "name": "x.y.First",
          "annotations": [ { "type": "org.springframework.modulith.PackageInfo" },
                           { "type": "x.Owner", "attributes": { "value": "one" } } ] },
        { "name": "x.y.Second",
          "annotations": [ { "type": "org.springframework.modulith.PackageInfo" },
                           { "type": "x.Owner", "attributes": { "value": "two" } } ] }
    ]
}"#;

#[test]
fn tree_lists_direct_sub_packages() -> anyhow::Result<()> {
    let base = temp_dir("tree");
    let manifest = base.join("universe.json");
    write_file(&manifest, MANIFEST)?;

    let tree = run_json(&["--universe", manifest.to_string_lossy().as_ref(), "tree", "a.b"])?;
    assert_eq!(tree["name"], "a.b");
    let children: Vec<&str> = tree["sub_packages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(children, vec!["a.b.c", "a.b.d"]);

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn classes_single_excludes_sub_packages() -> anyhow::Result<()> {
    let base = temp_dir("classes");
    let manifest = base.join("universe.json");
    write_file(&manifest, MANIFEST)?;
    let universe = manifest.to_string_lossy().to_string();

    let all = run_json(&["--universe", &universe, "classes", "a.b"])?;
    assert_eq!(all["classes"].as_array().unwrap().len(), 4);

    let single = run_json(&["--universe", &universe, "classes", "a.b", "--single"])?;
    assert_eq!(single["includes_sub_packages"], false);
    let names: Vec<&str> = single["classes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["a.b.Foo"]);

    let exposed = run_json(&["--universe", &universe, "classes", "a.b.c", "--exposed"])?;
    assert_eq!(exposed["classes"].as_array().unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn annotation_resolution_and_ambiguity() -> anyhow::Result<()> {
    let base = temp_dir("annotation");
    let manifest = base.join("universe.json");
    write_file(&manifest, MANIFEST)?;
    let universe = manifest.to_string_lossy().to_string();

    let found = run_json(&["--universe", &universe, "annotation", "a.b.c", "x.Owner"])?;
    assert_eq!(found["annotation"]["attributes"]["value"], "catalog");

    let absent = run_json(&["--universe", &universe, "annotation", "a.b.d", "x.Owner"])?;
    assert!(absent["annotation"].is_null());

    let ambiguous = run(&["--universe", &universe, "annotation", "x.y", "x.Owner"])?;
    assert!(!ambiguous.status.success());
    let stderr = String::from_utf8_lossy(&ambiguous.stderr);
    assert!(stderr.contains("Expected maximum of one type in package x.y"));
    assert!(stderr.contains("x.y.First") && stderr.contains("x.y.Second"));

    let annotated = run_json(&["--universe", &universe, "annotated", "a", "x.Owner"])?;
    assert_eq!(annotated, serde_json::json!(["a.b.c"]));

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn jars_and_directories_feed_the_universe() -> anyhow::Result<()> {
    let base = temp_dir("jars");
    let jar = base.join("libs/app.jar");
    write_jar(
        &jar,
        &["org/shop/orders/Order.class", "org/shop/billing/Invoice.class", "org/shop/App.class"],
    )?;
    write_file(&base.join("libs/broken.jar"), "not a zip")?;

    let from_jar = run_json(&["--jar", jar.to_string_lossy().as_ref(), "tree", "org.shop"])?;
    assert_eq!(from_jar["sub_packages"].as_array().unwrap().len(), 2);

    let from_dir = run_json(&["--dir", base.to_string_lossy().as_ref(), "stats"])?;
    assert_eq!(from_dir["classes"], 3);
    assert_eq!(from_dir["packages"], 3);

    let _ = std::fs::remove_dir_all(base);
    Ok(())
}

#[test]
fn missing_universe_fails_with_hint() -> anyhow::Result<()> {
    let out = run(&["--universe", "/definitely/not/here.json", "stats"])?;
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to read class manifest"));
    Ok(())
}
