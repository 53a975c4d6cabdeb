//! String helpers for project paths and platform identifiers

/// Normalise a project path for comparison against monorepo tag prefixes
///
/// Strips a leading `./` and any trailing `/`. `.` and `./` become the empty
/// string (repository root).
pub fn normalize_project_path(path: &str) -> String {
  let trimmed = path.trim();
  let trimmed = trimmed.strip_prefix("./").unwrap_or(trimmed);
  let trimmed = trimmed.trim_end_matches('/');
  if trimmed == "." { String::new() } else { trimmed.to_string() }
}

/// Form of a platform identifier usable inside an image tag or file name
///
/// `linux/arm64` becomes `linux_arm64`; variants keep their segment
/// (`linux/arm/v7` becomes `linux_arm_v7`).
pub fn platform_suffix(platform: &str) -> String {
  platform.replace('/', "_")
}
