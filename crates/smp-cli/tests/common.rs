#![allow(dead_code)]

use std::{
    fs, panic,
    path::{Path, PathBuf},
};

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use httptest::{matchers::*, responders::*, Expectation, Server};
use serde_json::{json, Value};
use tempfile::TempDir;

pub const BUILD_ROOT: &str = "/home/dev/app";

pub fn start_server() -> Option<Server> {
    match panic::catch_unwind(Server::run) {
        Ok(server) => Some(server),
        Err(_) => {
            eprintln!("skipping HTTP test (httptest server unavailable)");
            None
        }
    }
}

/// Command with every service endpoint pointed at `server`.
pub fn remap_cmd(server: &Server) -> Command {
    let base = server.url_str("/");
    let mut cmd = cargo_bin_cmd!("wasm-sourcemap-path");
    cmd.env("SMP_GITHUB_API", &base)
        .env("SMP_CRATES_API", &base)
        .env("SMP_BUILD_ROOT", BUILD_ROOT)
        .env("SMP_KEEP_PROXIES", "0")
        .env_remove("GITHUB_TOKEN")
        .env_remove("SMP_LOG")
        .env_remove("SMP_RAW_HOST")
        .env_remove("SMP_TOOLCHAIN_REPO");
    cmd
}

pub fn write_map(sources: &[&str]) -> (TempDir, PathBuf, PathBuf) {
    let temp = tempfile::Builder::new()
        .prefix("smp-cli")
        .tempdir()
        .expect("tempdir");
    let input = temp.path().join("app.wasm.map");
    let output = temp.path().join("out").join("app.wasm.map");
    fs::create_dir_all(output.parent().expect("parent")).expect("out dir");
    let map = json!({
        "version": 3,
        "file": "app.wasm",
        "sources": sources,
        "names": [],
        "mappings": "AAAA",
    });
    fs::write(&input, map.to_string()).expect("write input");
    (temp, input, output)
}

pub fn read_sources(path: &Path) -> Vec<Value> {
    let text = fs::read_to_string(path).expect("read output");
    let map: Value = serde_json::from_str(&text).expect("output json");
    map["sources"].as_array().expect("sources array").clone()
}

/// Repository `owner/name` at `revision` without a `.gitmodules` file.
pub fn expect_plain_tree(server: &Server, owner: &str, name: &str, revision: &str) {
    expect_tree(server, owner, name, revision, None, json!([]));
}

pub fn expect_tree(
    server: &Server,
    owner: &str,
    name: &str,
    revision: &str,
    gitmodules_base64: Option<&str>,
    entries: Value,
) {
    let contents = format!("/repos/{owner}/{name}/contents/.gitmodules");
    let gitmodules = Expectation::matching(all_of![
        request::method_path("GET", eq(contents)),
        request::query(url_decoded(contains(("ref", eq(revision.to_string()))))),
    ]);
    server.expect(match gitmodules_base64 {
        Some(content) => gitmodules.respond_with(json_encoded(json!({
            "type": "file",
            "encoding": "base64",
            "content": content,
        }))),
        None => gitmodules.respond_with(status_code(404)),
    });
    server.expect(
        Expectation::matching(request::method_path(
            "GET",
            eq(format!("/repos/{owner}/{name}/git/trees/{revision}")),
        ))
        .respond_with(json_encoded(json!({
            "sha": revision,
            "truncated": false,
            "tree": entries,
        }))),
    );
}

pub fn expect_crate(server: &Server, krate: &str, repository: Option<&str>) {
    server.expect(
        Expectation::matching(request::method_path(
            "GET",
            eq(format!("/api/v1/crates/{krate}")),
        ))
        .respond_with(json_encoded(json!({
            "crate": {"name": krate, "repository": repository}
        }))),
    );
}
