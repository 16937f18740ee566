//! Fixed dictionary of dream themes.
//!
//! The table is a compile-time constant; order matters because it breaks ties
//! when two themes score the same in one dream.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub interpretation: &'static str,
    pub tips: &'static [&'static str],
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "Flying",
        keywords: &["fly", "flying", "soar", "wings", "air", "floating", "levitate", "hover"],
        interpretation: "Flying dreams often represent freedom, ambition, and desire to rise above limitations.",
        tips: &[
            "Consider what areas of your life you want more freedom in",
            "Flying dreams may indicate you're ready to overcome obstacles",
            "Notice if you're in control while flying - this reflects confidence levels",
        ],
    },
    Theme {
        name: "Falling",
        keywords: &["fall", "falling", "drop", "tumble", "plunge", "crash", "cliff"],
        interpretation: "Falling dreams typically symbolize feelings of losing control or anxiety about failure.",
        tips: &[
            "Examine areas where you feel out of control in waking life",
            "Practice stress-reduction techniques before bed",
            "Consider what fears you might need to address",
        ],
    },
    Theme {
        name: "Chase",
        keywords: &["chase", "chasing", "pursue", "run", "running", "escape", "hunt", "follow"],
        interpretation: "Being chased often represents avoiding something in your waking life.",
        tips: &[
            "Think about what you might be avoiding or running from",
            "Consider facing challenges directly rather than avoiding them",
            "Identify the source of stress or anxiety in your life",
        ],
    },
    Theme {
        name: "Water",
        keywords: &["water", "ocean", "sea", "river", "lake", "swimming", "drowning", "waves", "flood"],
        interpretation: "Water dreams relate to emotions, subconscious thoughts, and life transitions.",
        tips: &[
            "Pay attention to the water's condition - calm or turbulent",
            "Consider your current emotional state and relationships",
            "Water dreams may signal need for emotional cleansing",
        ],
    },
    Theme {
        name: "Animals",
        keywords: &["dog", "cat", "horse", "bird", "snake", "lion", "tiger", "bear", "wolf", "animal"],
        interpretation: "Animals in dreams often represent instincts, desires, or aspects of personality.",
        tips: &[
            "Consider what the specific animal represents to you",
            "Think about your relationship with your instincts",
            "Animals may represent people or traits in your life",
        ],
    },
    Theme {
        name: "Death",
        keywords: &["death", "dying", "dead", "funeral", "grave", "cemetery", "corpse"],
        interpretation: "Death dreams usually symbolize endings, transformations, or new beginnings.",
        tips: &[
            "Consider what in your life is ending or changing",
            "Death dreams often represent personal growth",
            "Think about what new phase you're entering",
        ],
    },
    Theme {
        name: "School/Exam",
        keywords: &["school", "exam", "test", "classroom", "teacher", "student", "homework", "study"],
        interpretation: "School dreams often reflect feelings of being judged or tested in life.",
        tips: &[
            "Consider areas where you feel evaluated or judged",
            "Think about skills or knowledge you want to develop",
            "May indicate imposter syndrome or performance anxiety",
        ],
    },
    Theme {
        name: "House/Home",
        keywords: &["house", "home", "room", "door", "window", "stairs", "basement", "attic"],
        interpretation: "Houses represent the self, with different rooms symbolizing different aspects of personality.",
        tips: &[
            "Pay attention to which rooms appear in your dreams",
            "Consider the condition of the house - reflects self-perception",
            "Unknown rooms may represent undiscovered aspects of yourself",
        ],
    },
    Theme {
        name: "Vehicles",
        keywords: &["car", "train", "plane", "bus", "driving", "crash", "accident", "travel"],
        interpretation: "Vehicles represent your journey through life and sense of control over your direction.",
        tips: &[
            "Notice if you're driving or a passenger - reflects control in life",
            "Consider where you're going in the dream",
            "Vehicle problems may indicate obstacles in your path",
        ],
    },
    Theme {
        name: "Money",
        keywords: &["money", "cash", "rich", "poor", "wealthy", "coins", "bills", "treasure"],
        interpretation: "Money dreams relate to self-worth, values, and material concerns.",
        tips: &[
            "Consider your relationship with material security",
            "Think about what you truly value in life",
            "Money dreams may reflect confidence or insecurity",
        ],
    },
    Theme {
        name: "Pregnancy/Birth",
        keywords: &["pregnant", "pregnancy", "baby", "birth", "newborn", "labor"],
        interpretation: "Pregnancy dreams often symbolize new projects, ideas, or phases of life being born.",
        tips: &[
            "Consider what new project or idea you're developing",
            "Think about creative potential waiting to be expressed",
            "May indicate readiness for new responsibilities",
        ],
    },
    Theme {
        name: "Nakedness",
        keywords: &["naked", "nude", "undressed", "clothes", "embarrassed", "exposed"],
        interpretation: "Nakedness dreams often reflect vulnerability or fear of being exposed.",
        tips: &[
            "Consider areas where you feel vulnerable or exposed",
            "Think about authenticity and being true to yourself",
            "May indicate fear of judgment from others",
        ],
    },
    Theme {
        name: "Food",
        keywords: &["food", "eating", "hungry", "feast", "cooking", "restaurant", "meal"],
        interpretation: "Food dreams relate to nourishment, satisfaction, and fulfillment in life.",
        tips: &[
            "Consider what kind of fulfillment you're seeking",
            "Think about emotional or spiritual nourishment needs",
            "Pay attention to whether you're satisfied or still hungry",
        ],
    },
    Theme {
        name: "Lost",
        keywords: &["lost", "missing", "can't find", "searching", "maze", "confused", "direction"],
        interpretation: "Being lost represents uncertainty about life direction or feeling confused about choices.",
        tips: &[
            "Consider areas of life where you feel uncertain",
            "Think about what guidance or clarity you need",
            "May indicate need to reconnect with your goals",
        ],
    },
    Theme {
        name: "Fire",
        keywords: &["fire", "flames", "burn", "burning", "smoke", "heat", "explosion"],
        interpretation: "Fire represents passion, transformation, destruction, or purification.",
        tips: &[
            "Consider what needs to be transformed in your life",
            "Think about your passionate feelings or anger",
            "Fire may indicate need for purification or fresh start",
        ],
    },
];

/// Case-insensitive lookup by theme name.
pub fn find(name: &str) -> Option<&'static Theme> {
    let name = name.trim();
    THEMES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

pub fn names() -> impl Iterator<Item = &'static str> {
    THEMES.iter().map(|t| t.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(THEMES.len(), 15);
        let unique: HashSet<_> = names().collect();
        assert_eq!(unique.len(), THEMES.len());
        for theme in THEMES {
            assert!(!theme.keywords.is_empty(), "{} has no keywords", theme.name);
            assert_eq!(theme.tips.len(), 3, "{} should carry three tips", theme.name);
            assert!(theme.keywords.iter().all(|k| *k == k.to_lowercase()));
        }
    }

    #[test]
    fn test_find_ignores_case() {
        assert_eq!(find("water").map(|t| t.name), Some("Water"));
        assert_eq!(find(" school/exam ").map(|t| t.name), Some("School/Exam"));
        assert!(find("Unicorns").is_none());
    }
}
