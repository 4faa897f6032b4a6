//! Keyword tables that map free-text outfit descriptions to canonical tags.
//!
//! Matching is case-insensitive substring search over an ordered table, so one
//! description can yield several tags. Tables are plain data and can be swapped
//! out wholesale (tests use a minimal lexicon).

const COLOR_KEYWORDS: &[(&str, &str)] = &[
    ("black", "블랙"),
    ("검정", "블랙"),
    ("블랙", "블랙"),
    ("white", "화이트"),
    ("흰", "화이트"),
    ("화이트", "화이트"),
    ("navy", "네이비"),
    ("네이비", "네이비"),
    ("gray", "그레이"),
    ("grey", "그레이"),
    ("회색", "그레이"),
    ("그레이", "그레이"),
    ("beige", "베이지"),
    ("베이지", "베이지"),
    ("blue", "블루"),
    ("파란", "블루"),
    ("블루", "블루"),
    ("red", "레드"),
    ("빨간", "레드"),
    ("레드", "레드"),
    ("brown", "브라운"),
    ("갈색", "브라운"),
    ("브라운", "브라운"),
    ("green", "그린"),
    ("초록", "그린"),
    ("카키", "그린"),
    ("pink", "핑크"),
    ("분홍", "핑크"),
    ("핑크", "핑크"),
];

const STYLE_KEYWORDS: &[(&str, &str)] = &[
    ("casual", "casual"),
    ("캐주얼", "casual"),
    ("formal", "formal"),
    ("정장", "formal"),
    ("포멀", "formal"),
    ("sporty", "sporty"),
    ("스포티", "sporty"),
    ("운동", "sporty"),
    ("street", "street"),
    ("스트릿", "street"),
    ("minimal", "minimal"),
    ("미니멀", "minimal"),
    ("vintage", "vintage"),
    ("빈티지", "vintage"),
    ("romantic", "romantic"),
    ("러블리", "romantic"),
];

#[derive(Debug, Clone)]
pub struct Lexicon {
    colors: Vec<(String, String)>,
    styles: Vec<(String, String)>,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::from_static(COLOR_KEYWORDS, STYLE_KEYWORDS)
    }
}

impl Lexicon {
    pub fn new(colors: Vec<(String, String)>, styles: Vec<(String, String)>) -> Self {
        let lower = |table: Vec<(String, String)>| {
            table
                .into_iter()
                .map(|(keyword, tag)| (keyword.to_lowercase(), tag))
                .collect()
        };
        Self {
            colors: lower(colors),
            styles: lower(styles),
        }
    }

    pub fn from_static(colors: &[(&str, &str)], styles: &[(&str, &str)]) -> Self {
        let owned = |table: &[(&str, &str)]| {
            table
                .iter()
                .map(|(keyword, tag)| (keyword.to_string(), tag.to_string()))
                .collect()
        };
        Self::new(owned(colors), owned(styles))
    }

    pub fn extract_colors(&self, text: &str) -> Vec<String> {
        Self::extract(&self.colors, text)
    }

    pub fn extract_styles(&self, text: &str) -> Vec<String> {
        Self::extract(&self.styles, text)
    }

    /// Maps an explicit style tag to its canonical form, or lower-cases it when unknown.
    pub fn canonical_style(&self, tag: &str) -> String {
        let lowered = tag.trim().to_lowercase();
        self.styles
            .iter()
            .find(|(keyword, _)| *keyword == lowered)
            .map(|(_, canonical)| canonical.clone())
            .unwrap_or(lowered)
    }

    fn extract(table: &[(String, String)], text: &str) -> Vec<String> {
        let lowered = text.to_lowercase();
        let mut tags: Vec<String> = Vec::new();
        for (keyword, tag) in table {
            if lowered.contains(keyword.as_str()) && !tags.contains(tag) {
                tags.push(tag.clone());
            }
        }
        tags
    }
}
