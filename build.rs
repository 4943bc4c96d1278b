use chrono::Utc;

fn main() {
    // Stamp BUILD_TIME for the /health endpoint / 记录构建时间
    println!(
        "cargo:rustc-env=BUILD_TIME={}",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    println!("cargo:rerun-if-changed=build.rs");
}
