use std::cmp::Ordering;

pub const SKILL_SUGGESTION_LIMIT: usize = 5;
pub const LANGUAGE_SUGGESTION_LIMIT: usize = 8;

pub const TECHNICAL_SKILLS: &[&str] = &[
    "JavaScript",
    "TypeScript",
    "Java",
    "Python",
    "Rust",
    "Go",
    "C#",
    "C++",
    "SQL",
    "PostgreSQL",
    "React",
    "Angular",
    "Vue.js",
    "Node.js",
    "Docker",
    "Kubernetes",
    "AWS",
    "Azure",
    "Git",
    "Linux",
    "Machine Learning",
    "Data Analysis",
    "Power BI",
    "Excel",
    "AutoCAD",
    "SAP",
    "Network Administration",
    "Cybersecurity",
];

pub const MANAGERIAL_SKILLS: &[&str] = &[
    "Leadership",
    "Team Management",
    "Project Management",
    "Strategic Planning",
    "Budget Management",
    "Change Management",
    "Conflict Resolution",
    "Decision Making",
    "Negotiation",
    "Stakeholder Management",
    "Risk Management",
    "Performance Management",
    "Coaching",
    "Mentoring",
    "Communication",
    "Time Management",
    "Delegation",
    "Agile Methodologies",
    "Scrum",
    "Operations Management",
];

pub const LANGUAGES: &[&str] = &[
    "Arabic",
    "English",
    "French",
    "Spanish",
    "German",
    "Italian",
    "Portuguese",
    "Russian",
    "Chinese",
    "Japanese",
    "Korean",
    "Turkish",
    "Persian",
    "Tajik",
    "Uzbek",
    "Hindi",
    "Urdu",
    "Bengali",
    "Dutch",
    "Swedish",
];

/// Case-insensitive substring matches of `input` in `catalog`, skipping labels
/// already in `taken`. Exact matches rank first, then prefixes, then the rest
/// alphabetically.
pub fn rank<'a, S: AsRef<str>>(
    input: &str,
    catalog: &[&'a str],
    taken: &[S],
    limit: usize,
) -> Vec<&'a str> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let taken: Vec<String> = taken
        .iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .collect();

    let mut matches: Vec<(u8, String, &'a str)> = catalog
        .iter()
        .filter_map(|&candidate| {
            let lower = candidate.to_lowercase();
            if !lower.contains(&needle) || taken.contains(&lower) {
                return None;
            }
            let tier = if lower == needle {
                0
            } else if lower.starts_with(&needle) {
                1
            } else {
                2
            };
            Some((tier, lower, candidate))
        })
        .collect();

    matches.sort_by(|a, b| match a.0.cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });

    matches
        .into_iter()
        .take(limit)
        .map(|(_, _, candidate)| candidate)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn java_ranks_exact_then_prefix() {
        let out = rank("java", TECHNICAL_SKILLS, &[] as &[&str], SKILL_SUGGESTION_LIMIT);
        assert_eq!(out, vec!["Java", "JavaScript"]);
    }

    #[test]
    fn already_added_labels_are_excluded() {
        let out = rank("JAVA", TECHNICAL_SKILLS, &["java"], SKILL_SUGGESTION_LIMIT);
        assert_eq!(out, vec!["JavaScript"]);
    }

    #[test]
    fn substring_matches_follow_prefix_matches() {
        let out = rank("script", TECHNICAL_SKILLS, &[] as &[&str], SKILL_SUGGESTION_LIMIT);
        assert_eq!(out, vec!["JavaScript", "TypeScript"]);

        let out = rank("man", MANAGERIAL_SKILLS, &[] as &[&str], 10);
        assert_eq!(out[0], "Budget Management");
        assert!(out.iter().all(|s| s.to_lowercase().contains("man")));
    }

    #[test]
    fn results_are_capped() {
        let skills = rank("a", TECHNICAL_SKILLS, &[] as &[&str], SKILL_SUGGESTION_LIMIT);
        assert_eq!(skills.len(), SKILL_SUGGESTION_LIMIT);

        let languages = rank("a", LANGUAGES, &[] as &[&str], LANGUAGE_SUGGESTION_LIMIT);
        assert_eq!(languages.len(), LANGUAGE_SUGGESTION_LIMIT);
    }

    #[test]
    fn blank_input_suggests_nothing() {
        assert!(rank("  ", LANGUAGES, &[] as &[&str], LANGUAGE_SUGGESTION_LIMIT).is_empty());
    }
}
