//! Regenerates the C header for the `extern "C"` surface.

fn main() {
    println!("cargo:rerun-if-changed=src");
    let Ok(crate_dir) = std::env::var("CARGO_MANIFEST_DIR") else {
        return;
    };
    match cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .with_include_guard("ANIMAL_FFI_H")
        .generate()
    {
        Ok(bindings) => {
            bindings.write_to_file(format!("{crate_dir}/animal_ffi.h"));
        }
        Err(e) => println!("cargo:warning=header not generated: {e}"),
    }
}
