use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Файлы рабочего каталога, которые кладутся рядом с бинарником
const RUNTIME_FILES: &[&str] = &["config.toml"];

fn main() {
    let workspace_root = Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map(Path::to_path_buf)
        .expect("workspace root");
    let target_dir = profile_dir().expect("target profile directory");

    for name in RUNTIME_FILES {
        let source = workspace_root.join(name);
        println!("cargo:rerun-if-changed={}", source.display());

        if !source.exists() {
            println!("cargo:warning={} not found, embedded defaults will be used", name);
            continue;
        }
        let dest = target_dir.join(name);
        fs::copy(&source, &dest).unwrap_or_else(|e| panic!("copy {}: {}", name, e));
    }
}

/// target/debug или target/release (OUT_DIR лежит внутри него)
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(env::var("OUT_DIR").ok()?);
    let profile = env::var("PROFILE").ok()?;
    out_dir
        .ancestors()
        .find(|p| p.ends_with(&profile))
        .map(Path::to_path_buf)
}
