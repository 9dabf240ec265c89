fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=DEFAULT_CONF_FILE");

    let out_dir = std::env::var_os("OUT_DIR").expect("OUT_DIR is set by cargo");
    let path = std::path::Path::new(&out_dir).join("constants.rs");
    std::fs::write(
        &path,
        format!(
            "pub const DEFAULT_CONF_FILE: &str = {:?};",
            std::env::var_os("DEFAULT_CONF_FILE").unwrap_or_else(|| "cf-dns.conf".into())
        ),
    )
    .expect("Unable to write generated constants.rs");
}
