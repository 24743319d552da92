use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;

use crate::models::EventDraft;

pub const DEFAULT_PASSWORD: &str = "password123";
pub const PARTICIPANT_COUNT: usize = 10;

pub struct UserFixture {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub description: String,
}

impl UserFixture {
    fn new(first_name: &str, last_name: &str, email: &str, description: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: email.to_string(),
            description: description.to_string(),
        }
    }
}

/// Which organizer (by index into [`organizers`]) owns an event.
pub struct EventFixture {
    pub organizer: usize,
    pub draft: EventDraft,
    /// How long before the seed run the event was validated; `None` leaves
    /// it pending.
    pub validated_ago: Option<Duration>,
}

pub fn organizers() -> Vec<UserFixture> {
    vec![
        UserFixture::new(
            "Jean",
            "Martin",
            "jean.martin@gmail.com",
            "Organisateur d'événements tech et conférences.",
        ),
        UserFixture::new(
            "Sophie",
            "Lemoine",
            "sophie.lemoine@outlook.com",
            "Spécialisée dans l'organisation d'événements culturels.",
        ),
        UserFixture::new(
            "Alexandre",
            "Petit",
            "alex.petit@yahoo.fr",
            "Organisateur d'événements sportifs et de bien-être.",
        ),
    ]
}

pub fn participants() -> Vec<UserFixture> {
    (1..=PARTICIPANT_COUNT)
        .map(|i| UserFixture {
            first_name: format!("User{}", i),
            last_name: "Test".to_string(),
            email: format!("user{}@test.com", i),
            description: format!("Utilisateur de test {}", i),
        })
        .collect()
}

fn draft(
    title: &str,
    description: &str,
    start_date: DateTime<Utc>,
    duration: i32,
    price: Decimal,
    location: &str,
) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        description: description.to_string(),
        start_date: Some(start_date),
        duration: Some(duration),
        price: Some(price),
        location: location.to_string(),
    }
}

pub fn events(now: DateTime<Utc>) -> Vec<EventFixture> {
    vec![
        EventFixture {
            organizer: 0,
            draft: draft(
                "Hackathon IA & Santé",
                "48h pour développer des solutions innovantes alliant IA et Santé.",
                now + Duration::weeks(2),
                2880,
                Decimal::from(25),
                "Station F, Paris",
            ),
            validated_ago: Some(Duration::weeks(1)),
        },
        EventFixture {
            organizer: 1,
            draft: draft(
                "Concert Jazz Fusion",
                "Soirée jazz avec le quartet 'Fusion Elements'.",
                now + Duration::days(10),
                180,
                Decimal::from(35),
                "Le Blue Note, Paris",
            ),
            validated_ago: Some(Duration::days(4)),
        },
        EventFixture {
            organizer: 0,
            draft: draft(
                "Formation WordPress Avancée",
                "Maîtrisez WordPress comme un pro.",
                now + Duration::weeks(3),
                360,
                Decimal::from(120),
                "École du Web, Paris",
            ),
            validated_ago: Some(Duration::days(1)),
        },
        EventFixture {
            organizer: 0,
            draft: draft(
                "Conférence Blockchain",
                "Découvrez l'avenir de la finance décentralisée.",
                now + Duration::weeks(5),
                300,
                Decimal::from(75),
                "Palais des Congrès, Nice",
            ),
            validated_ago: None,
        },
        EventFixture {
            organizer: 1,
            draft: draft(
                "Atelier Cuisine Moléculaire",
                "Initiez-vous aux techniques de cuisine moléculaire.",
                now + Duration::weeks(6),
                180,
                Decimal::from(95),
                "Institut Culinaire de Lyon",
            ),
            validated_ago: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_events_pass_validation() {
        let now = Utc::now();
        for fixture in events(now) {
            assert!(
                fixture.draft.validate(now).is_ok(),
                "{} should be valid",
                fixture.draft.title
            );
            assert!(fixture.organizer < organizers().len());
        }
    }

    #[test]
    fn test_validation_happened_before_start() {
        let now = Utc::now();
        for fixture in events(now) {
            if let (Some(ago), Some(start)) = (fixture.validated_ago, fixture.draft.start_date) {
                assert!(now - ago < start);
            }
        }
    }

    #[test]
    fn test_participant_emails_are_distinct() {
        let mut emails: Vec<String> = participants().into_iter().map(|u| u.email).collect();
        emails.extend(organizers().into_iter().map(|u| u.email));
        let total = emails.len();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), total);
        assert_eq!(total, PARTICIPANT_COUNT + 3);
    }
}
