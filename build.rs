fn main() {
    // Supply a protoc binary for environments without a system install.
    // Does not affect generated code, only where the compiler is found.
    if std::env::var_os("PROTOC").is_none() {
        if let Ok(protoc) = protoc_bin_vendored::protoc_bin_path() {
            std::env::set_var("PROTOC", protoc);
        }
    }

    tonic_build::configure()
        .build_server(true)
        .build_client(true)
        .emit_rerun_if_changed(false)
        .compile_protos(&["proto/auction.proto"], &["proto"])
        .unwrap();
}
