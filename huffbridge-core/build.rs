// In: build.rs

//! Compiles `native-fixture/huffman_fixture.c` into two shared libraries that
//! the tests load through the real `libloading` path:
//!
//! - `$OUT_DIR/native-fixture/bin/libhuffman.<ext>` exports both entry points.
//! - `$OUT_DIR/native-fixture/partial/libhuffman.<ext>` exports only compress.
//!
//! The directory is passed to the crate as `HUFFBRIDGE_FIXTURE_DIR`. Without a
//! working C compiler the variable is simply not set and those tests skip.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const FIXTURE_SOURCE: &str = "native-fixture/huffman_fixture.c";

fn main() {
    println!("cargo:rerun-if-changed={}", FIXTURE_SOURCE);
    println!("cargo:rerun-if-changed=build.rs");

    let suffix = match env::var("CARGO_CFG_TARGET_OS").as_deref() {
        Ok("linux") => "so",
        Ok("macos") => "dylib",
        _ => return,
    };
    let out_dir = match env::var_os("OUT_DIR") {
        Some(dir) => PathBuf::from(dir).join("native-fixture"),
        None => return,
    };
    let file_name = format!("libhuffman.{}", suffix);

    let built = build_shared(&out_dir.join("bin").join(&file_name), &[]).and_then(|()| {
        build_shared(
            &out_dir.join("partial").join(&file_name),
            &["-DHUFFBRIDGE_OMIT_DECOMPRESS"],
        )
    });
    match built {
        Ok(()) => println!("cargo:rustc-env=HUFFBRIDGE_FIXTURE_DIR={}", out_dir.display()),
        Err(reason) => println!("cargo:warning=native fixture library not built: {}", reason),
    }
}

fn build_shared(output: &Path, defines: &[&str]) -> Result<(), String> {
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).map_err(|e| e.to_string())?;
    }
    let compiler = cc::Build::new()
        .cargo_metadata(false)
        .try_get_compiler()
        .map_err(|e| e.to_string())?;
    let status = compiler
        .to_command()
        .args(["-shared", "-fPIC", "-O1"])
        .args(defines)
        .arg("-o")
        .arg(output)
        .arg(FIXTURE_SOURCE)
        .status()
        .map_err(|e| e.to_string())?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("compiler exited with {}", status))
    }
}
