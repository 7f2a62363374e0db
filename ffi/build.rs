use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("set by cargo"));
    let include_dir = crate_dir.join("include");

    let generated = cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("HABIT_FFI_H")
        .generate();

    match generated {
        Ok(bindings) => {
            if std::fs::create_dir_all(&include_dir).is_ok() {
                bindings.write_to_file(include_dir.join("habit_ffi.h"));
            }
        }
        Err(err) => println!("cargo:warning=skipping habit_ffi.h generation: {err}"),
    }
}
