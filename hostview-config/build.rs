/*
 *     Copyright 2024 The Hostview Authors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

use std::env;
use std::path::Path;
use std::process::Command;

/// get_short_commit_hash returns the abbreviated hash of HEAD, if the
/// workspace is a git checkout.
fn get_short_commit_hash() -> Option<String> {
    if !Path::new("../.git").exists() {
        return None;
    }

    let output = match Command::new("git")
        .args(["rev-parse", "--short=9", "HEAD"])
        .output()
    {
        Ok(output) if output.status.success() => output,
        _ => return None,
    };

    let hash = String::from_utf8(output.stdout).ok()?;
    let hash = hash.trim();
    if hash.is_empty() {
        return None;
    }

    Some(hash.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=../.git/HEAD");

    // Expose the target triple as the build platform.
    if let Ok(target) = env::var("TARGET") {
        println!("cargo:rustc-env=BUILD_PLATFORM={}", target);
    }

    if let Some(hash) = get_short_commit_hash() {
        println!("cargo:rustc-env=GIT_COMMIT_SHORT_HASH={}", hash);
    }
}
