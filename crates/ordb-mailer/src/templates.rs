//! Built-in outreach email templates.
//!
//! One subject and one HTML body per (target type, language) pair, with the
//! handful of substitutions the templates actually use. Overrides from the
//! caller replace the rendered subject/body wholesale.

use ordb_core::TargetType;

use crate::OutreachTarget;

/// Rendered subject and HTML body for one outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub body: String,
}

/// Renders the built-in template for a target, in the given language
/// (`"en"` or `"fr"`; anything else falls back to English).
#[must_use]
pub fn render(
    target: &OutreachTarget,
    target_type: TargetType,
    language: &str,
    sender_name: &str,
) -> RenderedEmail {
    let recipient = target.name.as_str();
    match (target_type, language) {
        (TargetType::Daycare, "fr") => {
            let city = target.city.as_deref().unwrap_or("votre ville");
            RenderedEmail {
                subject: format!("Une idée pour les familles de {city}"),
                body: format!(
                    "<p>Bonjour {recipient},</p>\
                     <p>Nous travaillons avec des crèches à {city} et aimerions \
                     vous présenter notre programme pour les familles.</p>\
                     <p>Bien cordialement,<br>{sender_name}</p>"
                ),
            }
        }
        (TargetType::Daycare, _) => {
            let city = target.city.as_deref().unwrap_or("your city");
            RenderedEmail {
                subject: format!("An idea for families in {city}"),
                body: format!(
                    "<p>Hi {recipient},</p>\
                     <p>We work with daycares in {city} and would love to share \
                     our program for families with you.</p>\
                     <p>Best regards,<br>{sender_name}</p>"
                ),
            }
        }
        (TargetType::Influencer, "fr") => {
            let niche = target.niche.as_deref().unwrap_or("votre domaine");
            RenderedEmail {
                subject: format!("Collaboration autour de {niche}"),
                body: format!(
                    "<p>Bonjour {recipient},</p>\
                     <p>Votre contenu sur {niche} nous a beaucoup plu et nous \
                     aimerions discuter d'un partenariat.</p>\
                     <p>Bien cordialement,<br>{sender_name}</p>"
                ),
            }
        }
        (TargetType::Influencer, _) => {
            let niche = target.niche.as_deref().unwrap_or("your niche");
            let platform = target.platform.as_deref().unwrap_or("your platform");
            RenderedEmail {
                subject: format!("Partnership idea for your {niche} content"),
                body: format!(
                    "<p>Hi {recipient},</p>\
                     <p>We love your {niche} content on {platform} and would \
                     like to talk about a partnership.</p>\
                     <p>Best regards,<br>{sender_name}</p>"
                ),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daycare_target() -> OutreachTarget {
        OutreachTarget {
            id: 1,
            name: "Little Stars".to_string(),
            email: Some("hello@littlestars.example".to_string()),
            city: Some("Lyon".to_string()),
            region: Some("FRANCE".to_string()),
            platform: None,
            niche: None,
        }
    }

    #[test]
    fn french_daycare_template_uses_city() {
        let rendered = render(&daycare_target(), TargetType::Daycare, "fr", "AI Outreach");
        assert!(rendered.subject.contains("Lyon"));
        assert!(rendered.body.contains("Bonjour Little Stars"));
        assert!(rendered.body.contains("AI Outreach"));
    }

    #[test]
    fn unknown_language_falls_back_to_english() {
        let rendered = render(&daycare_target(), TargetType::Daycare, "de", "AI Outreach");
        assert!(rendered.body.starts_with("<p>Hi Little Stars"));
    }

    #[test]
    fn influencer_template_uses_platform_and_niche() {
        let target = OutreachTarget {
            id: 2,
            name: "Jo".to_string(),
            email: Some("jo@example.com".to_string()),
            city: None,
            region: None,
            platform: Some("YOUTUBE".to_string()),
            niche: Some("parenting".to_string()),
        };
        let rendered = render(&target, TargetType::Influencer, "en", "AI Outreach");
        assert!(rendered.subject.contains("parenting"));
        assert!(rendered.body.contains("YOUTUBE"));
    }
}
