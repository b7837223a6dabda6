use serde::{Deserialize, Serialize};

/// A blog article record from the optional article list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub slug: String,
    pub title: String,
    /// What the generated body should talk about.
    pub subject: String,
    pub category: String,
    pub image: String,
}

impl Article {
    /// Path of the article page relative to the output root.
    pub fn page_path(&self) -> String {
        format!("blog/{}.html", self.slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_page_lives_under_blog() {
        let article = Article {
            slug: "pleine-lune".to_string(),
            title: "La pleine lune".to_string(),
            subject: "les effets de la pleine lune".to_string(),
            category: "Lune".to_string(),
            image: "lune.jpg".to_string(),
        };
        assert_eq!(article.page_path(), "blog/pleine-lune.html");
    }
}
