//! Deterministic ordering of resolved artifacts.

use std::cmp::Ordering;

use kreactor_core::artifact::Artifact;

/// `group:artifactId:type:classifier:version`, with an empty classifier
/// segment when there is none.
pub fn sort_key(artifact: &Artifact) -> String {
    format!(
        "{}:{}:{}:{}:{}",
        artifact.group,
        artifact.artifact_id,
        artifact.type_,
        artifact.classifier.as_deref().unwrap_or(""),
        artifact.version
    )
}

/// Compare [`sort_key`] strings, except that an artifact without a
/// classifier sorts before its classified siblings. Scope breaks ties.
pub fn compare(a: &Artifact, b: &Artifact) -> Ordering {
    let prefix = |x: &Artifact| format!("{}:{}:{}", x.group, x.artifact_id, x.type_);
    prefix(a)
        .cmp(&prefix(b))
        .then_with(|| a.classifier.is_some().cmp(&b.classifier.is_some()))
        .then_with(|| sort_key(a).cmp(&sort_key(b)))
        .then_with(|| a.scope.cmp(&b.scope))
}

/// Sort artifacts in place.
pub fn sort(artifacts: &mut [Artifact]) {
    artifacts.sort_by(compare);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orders_by_coordinate() {
        let mut v = vec![
            Artifact::new("org.b", "x", "1.0"),
            Artifact::new("org.a", "y", "1.0"),
            Artifact::new("org.a", "x", "2.0"),
            Artifact::new("org.a", "x", "1.0").with_classifier("sources"),
            Artifact::new("org.a", "x", "1.0").with_classifier("1x"),
            Artifact::new("org.a", "x", "1.0"),
        ];
        sort(&mut v);
        let keys: Vec<String> = v.iter().map(sort_key).collect();
        assert_eq!(
            keys,
            [
                "org.a:x:jar::1.0",
                "org.a:x:jar::2.0",
                "org.a:x:jar:1x:1.0",
                "org.a:x:jar:sources:1.0",
                "org.a:y:jar::1.0",
                "org.b:x:jar::1.0",
            ]
        );
    }

    #[test]
    fn classifiers_compare_as_part_of_the_key() {
        let mut v = vec![
            Artifact::new("g", "x", "1.0").with_classifier("linux"),
            Artifact::new("g", "x", "1.0").with_classifier("linux-x86_64"),
            Artifact::new("g", "x", "2.0").with_classifier("a"),
            Artifact::new("g", "x", "1.0").with_classifier("a.b"),
            Artifact::new("g", "x", "3.0"),
        ];
        sort(&mut v);
        let keys: Vec<String> = v.iter().map(sort_key).collect();
        assert_eq!(
            keys,
            [
                "g:x:jar::3.0",
                "g:x:jar:a.b:1.0",
                "g:x:jar:a:2.0",
                "g:x:jar:linux-x86_64:1.0",
                "g:x:jar:linux:1.0",
            ]
        );
    }
}
