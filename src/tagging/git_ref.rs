//! Git ref parsing

const TAG_PREFIX: &str = "refs/tags/";
const BRANCH_PREFIX: &str = "refs/heads/";

/// The tag name of a `refs/tags/<tag>` ref; `None` for anything else
pub fn parse_tag_ref(git_ref: &str) -> Option<&str> {
  git_ref.strip_prefix(TAG_PREFIX).filter(|tag| !tag.is_empty())
}

/// The branch name of a `refs/heads/<branch>` ref; `None` for anything else
pub fn parse_branch_ref(git_ref: &str) -> Option<&str> {
  git_ref.strip_prefix(BRANCH_PREFIX).filter(|branch| !branch.is_empty())
}
