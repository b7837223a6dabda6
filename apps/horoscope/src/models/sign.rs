use serde::{Deserialize, Serialize};

/// One zodiac sign, as listed in the sign input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignRecord {
    /// Display name, accented ("Gémeaux").
    pub name: String,
    /// File- and URL-safe id ("gemeaux").
    pub slug: String,
    /// Display date range ("21 mai - 21 juin").
    pub date: String,
    /// Image file name inside the asset directory.
    pub image: String,
}

impl SignRecord {
    pub fn page_file(&self) -> String {
        format!("{}.html", self.slug)
    }
}

#[cfg(test)]
pub(crate) fn fixture_signs() -> Vec<SignRecord> {
    [
        ("Bélier", "belier", "21 mars - 19 avril"),
        ("Taureau", "taureau", "20 avril - 20 mai"),
        ("Gémeaux", "gemeaux", "21 mai - 20 juin"),
        ("Cancer", "cancer", "21 juin - 22 juillet"),
        ("Lion", "lion", "23 juillet - 22 août"),
        ("Vierge", "vierge", "23 août - 22 septembre"),
        ("Balance", "balance", "23 septembre - 22 octobre"),
        ("Scorpion", "scorpion", "23 octobre - 21 novembre"),
        ("Sagittaire", "sagittaire", "22 novembre - 21 décembre"),
        ("Capricorne", "capricorne", "22 décembre - 19 janvier"),
        ("Verseau", "verseau", "20 janvier - 18 février"),
        ("Poissons", "poissons", "19 février - 20 mars"),
    ]
    .into_iter()
    .map(|(name, slug, date)| SignRecord {
        name: name.to_string(),
        slug: slug.to_string(),
        date: date.to_string(),
        image: format!("{slug}.png"),
    })
    .collect()
}
