fn main() {
    let manifest = tauri_build::AppManifest::new().commands(&[
        "login",
        "logout",
        "restore_session",
        "get_profile",
        "get_webinars",
        "viewer_url",
        "get_mac_address",
        "toggle_fullscreen",
        "check_for_updates",
        "install_update",
    ]);

    let attrs = tauri_build::Attributes::new().app_manifest(manifest);
    tauri_build::try_build(attrs).expect("failed to run build script");
}
