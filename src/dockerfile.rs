//! Dockerfile rendering.
//!
//! Every image is the same five blocks in fixed order: base image, prologue
//! (build args, shell selection), the common package setup shared by all
//! images, the per-target compiler block, and the entry-point epilogue. Only
//! the base image and the compiler block vary per target, so rendering is a
//! deterministic function of the target tuple.

use crate::catalog::ClangVersion;
use crate::matrix::{BuildTarget, PRIMARY_EXTRA_PACKAGES, TargetKind};
use anyhow::{Result, bail};

/// First clang release that is only published through apt.llvm.org.
pub const LLVM_APT_THRESHOLD: u32 = 13;

/// Shell expression resolving the snapshot repository's clang version from
/// the package index. Evaluated inside the container build, where the
/// repository has already been added; the version is not knowable at
/// generation time.
const LLVM_APT_VERSION_LOOKUP: &str =
    "$(apt policy llvm 2>/dev/null | grep -E 'Candidate: 1:(.*).*$' - | cut -d':' -f3 | cut -d'.' -f1)";

const PROLOGUE: &str = r#"

ARG DEBIAN_FRONTEND=noninteractive
ARG CMAKE_VERSION=3.24.2

SHELL ["/bin/bash", "-Eeox", "pipefail", "-c"]
"#;

const INSTALL_BASE: &str = r#"
# Common package setup
RUN set -xe; \
    # Packages needed to install the other packages
    apt update; \
    apt install -y --no-install-recommends \
        apt-transport-https ca-certificates gnupg software-properties-common wget; \
    apt-add-repository -y -n 'ppa:ubuntu-toolchain-r/test'; \
    apt update; \
    # Generic build tools and python
    apt install -y --no-install-recommends \
        pkg-config make \
        python3 python3-pip python3-setuptools \
        ; \
    # CMake, straight from upstream
    wget -O /tmp/cmake.sh \
        https://github.com/Kitware/CMake/releases/download/v${CMAKE_VERSION}/cmake-${CMAKE_VERSION}-linux-$(uname -m).sh; \
    sh /tmp/cmake.sh --skip-license --exclude-subdir --prefix=/usr/local; \
    rm -rf /tmp/* /var/tmp/* /var/cache/apt/* /var/lib/apt/lists/*; \
    python3 -m pip install conan
"#;

const EPILOGUE: &str = r#"
# The entry point
COPY entrypoint.py /usr/local/bin/entrypoint.py
ENTRYPOINT ["/usr/local/bin/entrypoint.py"]
SHELL ["/bin/bash", "-c"]
"#;

/// One image's compiler ask. At least one family must be present.
#[derive(Clone, Copy, Debug, Default)]
pub struct ToolchainRequest<'a> {
    pub clang: Option<ClangVersion>,
    pub gcc: Option<u32>,
    pub extra_packages: Option<&'a str>,
}

/// Render the full Dockerfile for one target.
pub fn render(target: &BuildTarget) -> Result<String> {
    let mut doc = String::new();
    doc.push_str(&format!("FROM {}", target.base_image()));
    doc.push_str(PROLOGUE);
    doc.push_str(INSTALL_BASE);
    doc.push_str(&toolchain_block(&request_for(target))?);
    doc.push_str(EPILOGUE);
    Ok(doc)
}

fn request_for(target: &BuildTarget) -> ToolchainRequest<'static> {
    match &target.kind {
        TargetKind::Primary { clang, gcc } => ToolchainRequest {
            clang: *clang,
            gcc: *gcc,
            extra_packages: Some(PRIMARY_EXTRA_PACKAGES),
        },
        TargetKind::Clang { clang } => ToolchainRequest {
            clang: Some(*clang),
            ..ToolchainRequest::default()
        },
        TargetKind::Gcc { gcc }
        | TargetKind::GccCuda { gcc, .. }
        | TargetKind::GccNvhpc { gcc, .. } => ToolchainRequest {
            gcc: Some(*gcc),
            ..ToolchainRequest::default()
        },
    }
}

/// Render the compiler-installation block.
///
/// Clang registers its aliases before gcc; when both families are present
/// the later `update-alternatives --install` wins the generic names, so gcc
/// deliberately ends up owning `gcc`/`g++`/`gcov`. Keep that order.
pub fn toolchain_block(request: &ToolchainRequest) -> Result<String> {
    if request.clang.is_none() && request.gcc.is_none() {
        bail!("target requests no compiler family; each image needs clang or gcc");
    }

    let mut alts: Vec<(String, String)> = Vec::new();
    let mut pre_install = String::from("apt -y update;");
    let mut packages = String::new();

    if let Some(clang) = request.clang {
        let deferred = match clang {
            ClangVersion::Dev => true,
            ClangVersion::Release(v) => v >= LLVM_APT_THRESHOLD,
        };

        let mut repo_steps: Vec<String> = Vec::new();
        let version_binding = if deferred {
            // Recent releases and the snapshot live on apt.llvm.org; the
            // repository suffix is empty for the snapshot, "-N" for a pinned
            // release. Either way the installable version comes out of the
            // freshly added index, so `v` binds at container-build time.
            let repo_suffix = match clang {
                ClangVersion::Dev => String::new(),
                ClangVersion::Release(v) => format!("-{v}"),
            };
            repo_steps.push(
                "wget -qO - https://apt.llvm.org/llvm-snapshot.gpg.key | apt-key add -"
                    .to_string(),
            );
            repo_steps.push(format!(
                "apt-add-repository -y -n \"deb http://apt.llvm.org/$(lsb_release -cs)/ llvm-toolchain-$(lsb_release -cs){repo_suffix} main\""
            ));
            LLVM_APT_VERSION_LOOKUP.to_string()
        } else {
            clang.to_string()
        };

        pre_install = String::new();
        if !repo_steps.is_empty() {
            pre_install = repo_steps.join("; \\\n    ");
            pre_install.push_str("; \\\n    ");
        }
        pre_install.push_str(&format!(
            "apt update; \\\n    \
             v=\"{version_binding}\"; \\\n    \
             apt policy llvm-$v; \\\n    \
             apt policy clang-$v; \\\n    \
             apt policy clang-tidy-$v; \\\n    \
             apt policy clang-format-$v; \\\n    \
             apt policy libc++-$v-dev; \\\n    \
             apt policy libc++abi-$v-dev; \\\n"
        ));

        packages.push_str(
            "\\\n        llvm-$v \\\n        clang-$v \\\n        clang-tidy-$v \\\n        clang-format-$v \\\n        libc++-$v-dev \\\n        libc++abi-$v-dev",
        );

        alts.extend([
            ("clang".to_string(), "/usr/bin/clang-$v".to_string()),
            ("clang++".to_string(), "/usr/bin/clang++-$v".to_string()),
            ("clang-tidy".to_string(), "/usr/bin/clang-tidy-$v".to_string()),
            ("clang-format".to_string(), "/usr/bin/clang-format-$v".to_string()),
            ("llvm-cov".to_string(), "/usr/lib/llvm-$v/bin/llvm-cov".to_string()),
            ("run-clang-tidy".to_string(), "/usr/lib/llvm-$v/bin/run-clang-tidy".to_string()),
        ]);

        if request.gcc.is_none() {
            // Generic names resolve to the clang binaries so tooling that
            // expects gcc/g++/gcov keeps working in clang-only images.
            alts.extend([
                ("gcc".to_string(), "/usr/bin/clang-$v".to_string()),
                ("g++".to_string(), "/usr/bin/clang++-$v".to_string()),
                ("gcov".to_string(), "/usr/lib/llvm-$v/bin/llvm-cov".to_string()),
            ]);
        }
    }

    if let Some(gcc) = request.gcc {
        append_package(&mut packages, &format!("g++-{gcc}"));
        alts.extend([
            ("gcc".to_string(), format!("/usr/bin/gcc-{gcc}")),
            ("g++".to_string(), format!("/usr/bin/g++-{gcc}")),
            ("gcov".to_string(), format!("/usr/bin/gcov-{gcc}")),
        ]);
    }

    if let Some(extra) = request.extra_packages {
        append_package(&mut packages, extra);
    }

    Ok(format!(
        "\n# Compiler toolchain\nRUN set -xe; \\\n    {pre_install} \\\n    apt install -y --no-install-recommends \\\n        {packages} \\\n    ; \\\n    rm -rf /var/lib/apt/lists/*; \\\n    {alternatives}\n",
        alternatives = render_alternatives(&alts),
    ))
}

/// Render ordered alias registrations. The first pair becomes the primary
/// `update-alternatives --install`; the rest ride along as `--slave`
/// bindings in the same priority group.
fn render_alternatives(alts: &[(String, String)]) -> String {
    let mut out = String::new();
    for (alias, actual) in alts {
        let rule = format!("/usr/bin/{alias} {alias} {actual}");
        if out.is_empty() {
            out = format!("update-alternatives --install {rule} 100 ");
        } else {
            out.push_str(&format!(" \\\n        --slave {rule}"));
        }
    }
    out
}

fn append_package(packages: &mut String, name: &str) {
    if !packages.is_empty() {
        packages.push(' ');
    }
    packages.push_str(name);
}
