//! Compose manifest rendering.
//!
//! One service stanza per target under a single `services:` root. The
//! service name, image tag, and Dockerfile reference all derive from the
//! target slug, so the manifest stays in lockstep with the generated files.

use crate::matrix::BuildTarget;

/// Render the whole manifest for an enumerated target list.
pub fn render_manifest(targets: &[BuildTarget], repo: &str) -> String {
    let mut doc = String::from("services:\n");
    for target in targets {
        doc.push_str(&service_stanza(target, repo));
    }
    doc
}

/// One service entry: image tag plus build context/dockerfile.
pub fn service_stanza(target: &BuildTarget, repo: &str) -> String {
    format!(
        "  {slug}:\n    image: {image}\n    build:\n      context: .\n      dockerfile: {dockerfile}\n",
        slug = target.slug(),
        image = target.image_tag(repo),
        dockerfile = target.dockerfile_name(),
    )
}
