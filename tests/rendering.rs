// Dockerfile template guard rails: block order, alias ordering, and the
// build-time version binding for apt.llvm.org clang releases.
#[path = "support/common.rs"]
mod common;

use imageforge::dockerfile::{LLVM_APT_THRESHOLD, ToolchainRequest, render, toolchain_block};
use imageforge::{BuildTarget, ClangVersion, TargetKind, emit, enumerate};
use tempfile::TempDir;

use common::{small_catalog, snapshot_dir};

fn gcc_target(os: &str, gcc: u32) -> BuildTarget {
    BuildTarget {
        os: os.to_string(),
        kind: TargetKind::Gcc { gcc },
    }
}

fn clang_request(clang: ClangVersion) -> ToolchainRequest<'static> {
    ToolchainRequest {
        clang: Some(clang),
        ..ToolchainRequest::default()
    }
}

#[test]
fn blocks_appear_in_fixed_order() {
    let doc = render(&gcc_target("22.04", 12)).unwrap();
    assert!(doc.starts_with("FROM ubuntu:22.04\n"));
    let prologue = doc.find("SHELL [\"/bin/bash\", \"-Eeox\", \"pipefail\", \"-c\"]").unwrap();
    let base = doc.find("# Common package setup").unwrap();
    let toolchain = doc.find("# Compiler toolchain").unwrap();
    let epilogue = doc.find("# The entry point").unwrap();
    assert!(prologue < base && base < toolchain && toolchain < epilogue);
    assert!(doc.trim_end().ends_with("SHELL [\"/bin/bash\", \"-c\"]"));
}

#[test]
fn primary_image_installs_both_families_and_extra_tools() {
    let doc = render(&BuildTarget {
        os: "20.04".to_string(),
        kind: TargetKind::Primary {
            clang: Some(ClangVersion::Dev),
            gcc: Some(11),
        },
    })
    .unwrap();
    assert!(doc.contains("clang-$v"));
    assert!(doc.contains("g++-11"));
    assert!(doc.contains("curl git cppcheck iwyu lcov"));
}

#[test]
fn clang_aliases_register_strictly_before_gcc_aliases() {
    let block = toolchain_block(&ToolchainRequest {
        clang: Some(ClangVersion::Release(15)),
        gcc: Some(12),
        extra_packages: None,
    })
    .unwrap();
    let clang_alias = block.find("/usr/bin/clang-$v").unwrap();
    let last_clang_alias = block.find("run-clang-tidy /usr/lib/llvm-$v/bin/run-clang-tidy").unwrap();
    let gcc_alias = block.find("gcc /usr/bin/gcc-12").unwrap();
    assert!(clang_alias < gcc_alias);
    assert!(last_clang_alias < gcc_alias, "gcc registration must come after every clang alias");
    // With gcc present the generic names must not be bound to clang.
    assert!(!block.contains("gcc /usr/bin/clang-$v"));
    assert!(!block.contains("g++ /usr/bin/clang++-$v"));
}

#[test]
fn clang_only_images_alias_the_generic_names_onto_clang() {
    let block = toolchain_block(&clang_request(ClangVersion::Release(12))).unwrap();
    assert!(block.contains("--slave /usr/bin/gcc gcc /usr/bin/clang-$v"));
    assert!(block.contains("--slave /usr/bin/g++ g++ /usr/bin/clang++-$v"));
    assert!(block.contains("--slave /usr/bin/gcov gcov /usr/lib/llvm-$v/bin/llvm-cov"));
}

#[test]
fn versions_at_the_apt_llvm_threshold_bind_at_container_build_time() {
    let block = toolchain_block(&clang_request(ClangVersion::Release(LLVM_APT_THRESHOLD))).unwrap();
    assert!(block.contains("apt.llvm.org"));
    assert!(block.contains("v=\"$(apt policy llvm"));
    assert!(
        !block.contains(&format!("v=\"{LLVM_APT_THRESHOLD}\"")),
        "deferred branch must not bind a literal version"
    );
    assert!(block.contains(&format!(
        "llvm-toolchain-$(lsb_release -cs)-{LLVM_APT_THRESHOLD} main"
    )));
}

#[test]
fn versions_below_the_threshold_bind_literally() {
    let below = LLVM_APT_THRESHOLD - 1;
    let block = toolchain_block(&clang_request(ClangVersion::Release(below))).unwrap();
    assert!(block.contains(&format!("v=\"{below}\"")));
    assert!(!block.contains("apt.llvm.org"));
}

#[test]
fn dev_sentinel_uses_the_unsuffixed_snapshot_repository() {
    let block = toolchain_block(&clang_request(ClangVersion::Dev)).unwrap();
    assert!(block.contains("llvm-toolchain-$(lsb_release -cs) main"));
    assert!(block.contains("v=\"$(apt policy llvm"));
}

#[test]
fn gcc_only_images_register_gcc_as_the_primary_alias() {
    let block = toolchain_block(&ToolchainRequest {
        gcc: Some(9),
        ..ToolchainRequest::default()
    })
    .unwrap();
    assert!(block.contains("update-alternatives --install /usr/bin/gcc gcc /usr/bin/gcc-9 100"));
    assert!(block.contains("--slave /usr/bin/g++ g++ /usr/bin/g++-9"));
    assert!(block.contains("--slave /usr/bin/gcov gcov /usr/bin/gcov-9"));
    assert!(!block.contains("clang"));
}

#[test]
fn cuda_targets_start_from_the_vendor_image() {
    let targets = enumerate(&small_catalog());
    let cuda = targets
        .iter()
        .find(|t| t.slug() == "gcc9-cuda11.7.1-ubuntu22.04")
        .unwrap();
    let doc = render(cuda).unwrap();
    assert!(doc.starts_with("FROM nvidia/cuda:11.7.1-devel-ubuntu22.04\n"));
}

#[test]
fn generation_is_byte_identical_across_runs() {
    let targets = enumerate(&small_catalog());
    for target in &targets {
        assert_eq!(render(target).unwrap(), render(target).unwrap());
    }

    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    emit::emit_matrix(first.path(), &targets, "example/repo").unwrap();
    emit::emit_matrix(second.path(), &targets, "example/repo").unwrap();
    assert_eq!(
        snapshot_dir(first.path()).unwrap(),
        snapshot_dir(second.path()).unwrap()
    );
}
