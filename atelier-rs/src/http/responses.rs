use serde::{Deserialize, Serialize};

use crate::db::{Link, Role};
use crate::exhibitions::Exhibition;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhibitions: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub username: String,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateExhibitionRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ExhibitionCreatedResponse {
    pub message: &'static str,
    pub exhibition: Exhibition,
}

#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    pub name: Option<String>,
    pub url: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkCreatedResponse {
    pub message: &'static str,
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct LinksResponse {
    pub links: Vec<LinkGroup>,
    pub categories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkGroup {
    pub category: String,
    pub items: Vec<LinkItem>,
}

#[derive(Debug, Serialize)]
pub struct LinkItem {
    pub name: String,
    pub url: String,
}

pub const UNCATEGORIZED: &str = "uncategorized";

/// Group rows into `{category, items}` blocks. Rows arrive ordered by
/// category then insertion id, so equal categories are contiguous and both
/// group order and item order are preserved.
pub fn group_links(rows: Vec<Link>) -> LinksResponse {
    let mut groups: Vec<LinkGroup> = Vec::new();

    for link in rows {
        let category = link
            .category
            .unwrap_or_else(|| String::from(UNCATEGORIZED));
        let item = LinkItem {
            name: link.name,
            url: link.url,
        };
        match groups.last_mut() {
            Some(group) if group.category == category => group.items.push(item),
            _ => groups.push(LinkGroup {
                category,
                items: vec![item],
            }),
        }
    }

    let categories = groups
        .iter()
        .map(|group| group.category.clone())
        .collect::<Vec<_>>();

    LinksResponse {
        links: groups,
        categories,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Painting {
    pub id: u32,
    pub title: &'static str,
    pub category: &'static str,
    pub image: &'static str,
}

/// Hardcoded painting catalogue.
pub fn paintings() -> Vec<Painting> {
    vec![
        Painting {
            id: 1,
            title: "Sunset Bliss",
            category: "landscape",
            image: "/images/sunset.jpg",
        },
        Painting {
            id: 2,
            title: "The Thinker",
            category: "portrait",
            image: "/images/thinker.jpg",
        },
        Painting {
            id: 3,
            title: "Abstract Dreams",
            category: "abstract",
            image: "/images/abstract.jpg",
        },
        Painting {
            id: 4,
            title: "Mountain View",
            category: "landscape",
            image: "/images/mountain.jpg",
        },
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct Biography {
    pub title: &'static str,
    pub content: &'static str,
    pub image: &'static str,
}

pub fn biography() -> Biography {
    Biography {
        title: "Biography of Leonardo da Vinci",
        content: BIOGRAPHY_TEXT,
        image: "/images/artist.jpg",
    }
}

const BIOGRAPHY_TEXT: &str = "\
Biography of Leonardo da Vinci
Full Name: Leonardo di ser Piero da Vinci
Birth: April 15, 1452, in Vinci, Republic of Florence (now Italy)
Death: May 2, 1519, in Amboise, Kingdom of France
Profession: Painter, sculptor, architect, inventor, scientist, engineer, anatomist, musician, writer

Early Life
Leonardo da Vinci was born out of wedlock to Piero Fruosino di Antonio da Vinci, a notary, and Caterina, a peasant woman. Raised in his father's household, he received an informal education in Latin, geometry, and mathematics. His artistic talents became evident at an early age, leading to an apprenticeship under the renowned artist Andrea del Verrocchio in Florence.

Artistic Contributions
Leonardo is celebrated as one of the greatest painters in history, blending realism with imaginative and symbolic elements. His most famous works include:

Mona Lisa (1503-1506): Known for its enigmatic expression and pioneering use of sfumato (a technique for soft transitions between colors and tones).
The Last Supper (1495-1498): A monumental depiction of Jesus and his disciples, celebrated for its perspective and emotional intensity.
Vitruvian Man (c. 1490): A drawing that explores human proportion and its relation to geometry, symbolizing the blend of art and science.
Many of his works remained unfinished due to his insatiable curiosity and constant experimentation.

Scientific and Technological Achievements
Leonardo's notebooks, filled with sketches and observations, reveal his genius in a wide range of disciplines. Highlights include:

Anatomy: His detailed studies of the human body, including muscles, organs, and bones, contributed to the understanding of human physiology.
Engineering: He designed war machines, flying devices, and hydraulic systems, many of which were centuries ahead of their time.
Natural Sciences: Leonardo studied the behavior of water, plants, and the movement of air, demonstrating a profound understanding of the natural world.
His notebooks, written in mirror script, were not widely understood during his lifetime but have since become a treasure trove of insight into Renaissance science and art.

Later Life
In 1516, Leonardo moved to France at the invitation of King Francis I, where he was given the title of \"Premier Painter and Engineer and Architect of the King.\" He spent his final years in the Chateau du Clos Luce near the royal chateau of Amboise, continuing his studies and refining his inventions.

Legacy
Leonardo da Vinci epitomizes the Renaissance ideal of a \"universal genius\" or \"Renaissance man,\" excelling in multiple fields of human endeavor. His works remain iconic, blending artistic mastery with a profound understanding of science and the natural world. His legacy continues to inspire artists, scientists, and thinkers, symbolizing the boundless potential of human creativity and intellect.

Fun Facts
Leonardo was ambidextrous and often wrote with his left hand.
He was a vegetarian and an advocate for animal welfare.
Many of his inventions, such as the helicopter and tank, were conceptualized centuries before they became feasible.
Leonardo da Vinci's life and works remain a testament to the limitless potential of human curiosity and imagination.
";

#[cfg(test)]
mod tests {
    use crate::db::Link;

    use super::{group_links, paintings, UNCATEGORIZED};

    fn link(id: i64, name: &str, url: &str, category: Option<&str>) -> Link {
        Link {
            id,
            name: name.to_string(),
            url: url.to_string(),
            category: category.map(str::to_string),
        }
    }

    #[test]
    fn grouping_preserves_category_and_item_order() {
        let rows = vec![
            link(1, "X", "https://x.example", Some("galleries")),
            link(2, "Y", "https://y.example", Some("galleries")),
            link(3, "Z", "https://z.example", Some("shops")),
        ];

        let grouped = group_links(rows);

        assert_eq!(grouped.categories, ["galleries", "shops"]);
        assert_eq!(grouped.links.len(), 2);
        assert_eq!(grouped.links[0].items.len(), 2);
        assert_eq!(grouped.links[0].items[0].name, "X");
        assert_eq!(grouped.links[0].items[1].name, "Y");
    }

    #[test]
    fn rows_without_category_fall_into_uncategorized() {
        let rows = vec![link(1, "X", "https://x.example", None)];

        let grouped = group_links(rows);

        assert_eq!(grouped.categories, [UNCATEGORIZED]);
    }

    #[test]
    fn painting_catalogue_is_fixed() {
        let all = paintings();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].title, "Sunset Bliss");
    }
}
