use std::env;

/// Generate a User-Agent string for outbound requests
/// Format: nowplaying-bridge/0.1.0 (linux; x86_64)
pub fn generate_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    let os = get_os_name();
    let arch = get_arch_name();

    format!("nowplaying-bridge/{} ({}; {})", version, os, arch)
}

fn get_os_name() -> &'static str {
    match env::consts::OS {
        "linux" => "linux",
        "macos" => "macos",
        "windows" => "windows",
        _ => "unknown",
    }
}

fn get_arch_name() -> &'static str {
    match env::consts::ARCH {
        "x86_64" => "x86_64",
        "aarch64" => "aarch64",
        "arm" => "arm",
        _ => "unknown",
    }
}
