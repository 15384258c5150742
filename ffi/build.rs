//! Generate `sdapi.h` for C callers into `OUT_DIR`.

use std::env;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src/lib.rs");
    println!("cargo:rerun-if-changed=src/types.rs");

    let crate_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let out_dir = env::var("OUT_DIR").map(PathBuf::from).unwrap_or_else(|_| PathBuf::from("."));

    let result = cbindgen::Builder::new()
        .with_crate(crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("SDAPI_H")
        .generate();

    match result {
        Ok(bindings) => {
            bindings.write_to_file(out_dir.join("sdapi.h"));
        }
        // A header failure must not break the Rust build.
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
