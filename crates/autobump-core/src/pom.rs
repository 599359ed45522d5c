//! Maven `pom.xml` version lookup.
//!
//! Only the project's own `<version>` (a direct child of `<project>`) is
//! read. Versions inside `<parent>`, `<dependencies>`, `<properties>` and
//! the like belong to other artifacts and are skipped.

use regex::Regex;
use std::sync::LazyLock;

// <!-- ... -->, possibly spanning lines
static COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment pattern is valid"));

// Element tags: <name ...>, </name>, <name/>. Skips <?xml ?> and <!DOCTYPE>.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z_][\w.:-]*)[^>]*?(/?)>").expect("tag pattern is valid")
});

/// Extract `<project><version>` from pom content.
///
/// Returns `None` when the project inherits its version from the parent or
/// the element is empty.
pub fn project_version(content: &str) -> Option<String> {
    let content = COMMENT_RE.replace_all(content, "");
    let mut stack: Vec<&str> = Vec::new();
    let mut version_start = None;

    for caps in TAG_RE.captures_iter(&content) {
        let tag = caps.get(0)?;
        let name = local_name(caps.get(2)?.as_str());
        let closing = !caps[1].is_empty();
        let self_closing = !caps[3].is_empty();

        if closing {
            if is_project_version(&stack)
                && let Some(start) = version_start.take()
            {
                let version = content[start..tag.start()].trim();
                return (!version.is_empty()).then(|| version.to_owned());
            }
            stack.pop();
            continue;
        }

        if self_closing {
            continue;
        }

        stack.push(name);
        if is_project_version(&stack) {
            version_start = Some(tag.end());
        }
    }

    None
}

fn is_project_version(stack: &[&str]) -> bool {
    matches!(stack, ["project", "version"])
}

/// Drop a namespace prefix (`pom:version` is `version`).
fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.example</groupId>
    <artifactId>parent</artifactId>
    <version>5.0.0</version>
  </parent>
  <artifactId>app</artifactId>
  <version>1.4.0-SNAPSHOT</version>
  <dependencies>
    <dependency>
      <artifactId>lib</artifactId>
      <version>0.1.0</version>
    </dependency>
  </dependencies>
</project>
"#;

    #[test]
    fn reads_project_version_after_parent() {
        assert_eq!(project_version(POM), Some("1.4.0-SNAPSHOT".into()));
    }

    #[test]
    fn inherited_version_is_none() {
        let pom = "<project><parent><version>5.0.0</version></parent>\
                   <dependencies><dependency><version>1.0</version></dependency>\
                   </dependencies></project>";
        assert_eq!(project_version(pom), None);
    }

    #[test]
    fn commented_out_version_is_ignored() {
        let pom = "<project>\n  <!-- <version>0.0.1</version> -->\n  \
                   <version>2.0.0</version>\n</project>";
        assert_eq!(project_version(pom), Some("2.0.0".into()));
    }

    #[test]
    fn whitespace_around_version_is_trimmed() {
        let pom = "<project><version>\n    3.1.0\n  </version></project>";
        assert_eq!(project_version(pom), Some("3.1.0".into()));
    }

    #[test]
    fn empty_or_self_closing_version_is_none() {
        assert_eq!(project_version("<project><version/></project>"), None);
        assert_eq!(project_version("<project><version> </version></project>"), None);
    }

    #[test]
    fn not_a_pom() {
        assert_eq!(project_version("version = \"1.0.0\""), None);
        assert_eq!(project_version(""), None);
    }
}
