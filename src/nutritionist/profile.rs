//! Validation of nutritionist profile edits.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::{
    booking::slots,
    models::nutritionists::{NewNutritionist, UpdateNutritionist},
    utils::trim_opt,
};

#[derive(Clone, Default, Deserialize, Serialize, Debug, PartialEq)]
pub struct AvailableHours {
    pub start: String,
    pub end: String,
}

/// Editable profile fields. Absent fields are left untouched.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<i32>,
    pub license: Option<String>,
    pub bio: Option<String>,
    pub contact: Option<String>,
    pub location: Option<String>,
    pub price_per_session: Option<u64>,
    pub available_days: Option<Vec<String>>,
    pub available_hours: Option<AvailableHours>,
    pub photo: Option<String>,
}

pub fn build_update(fields: ProfileFields) -> anyhow::Result<UpdateNutritionist> {
    if let Some(years) = fields.experience_years {
        if years < 0 {
            bail!("Experience years must not be negative");
        }
    }
    let available_days = match fields.available_days {
        Some(days) => Some(slots::join_days(&days)?),
        None => None,
    };
    let (available_start, available_end) = match fields.available_hours {
        Some(hours) => {
            slots::assert_hours(&hours.start, &hours.end)?;
            (
                Some(hours.start.trim().to_string()),
                Some(hours.end.trim().to_string()),
            )
        }
        None => (None, None),
    };

    Ok(UpdateNutritionist {
        name: trim_opt(fields.name),
        specialization: trim_opt(fields.specialization),
        experience_years: fields.experience_years,
        license: trim_opt(fields.license),
        bio: trim_opt(fields.bio),
        contact: trim_opt(fields.contact),
        location: trim_opt(fields.location),
        price_per_session: fields.price_per_session,
        available_days,
        available_start,
        available_end,
        photo: trim_opt(fields.photo),
    })
}

/// A first-time profile needs every required field.
pub fn build_new(user_id: u64, fields: ProfileFields) -> anyhow::Result<NewNutritionist> {
    let update = build_update(fields)?;
    let missing = [
        ("name", update.name.is_none()),
        ("specialization", update.specialization.is_none()),
        ("experience_years", update.experience_years.is_none()),
        ("bio", update.bio.is_none()),
        ("price_per_session", update.price_per_session.is_none()),
        ("available_hours", update.available_start.is_none()),
        (
            "available_days",
            update.available_days.as_deref().map_or(true, str::is_empty),
        ),
    ]
    .iter()
    .filter(|(_, missing)| *missing)
    .map(|(field, _)| *field)
    .collect::<Vec<_>>();
    if !missing.is_empty() {
        bail!("Missing required fields: {}", missing.join(", "));
    }

    Ok(NewNutritionist {
        user_id,
        name: update.name.unwrap_or_default(),
        specialization: update.specialization.unwrap_or_default(),
        experience_years: update.experience_years.unwrap_or_default(),
        license: update.license,
        bio: update.bio.unwrap_or_default(),
        contact: update.contact,
        location: update.location,
        price_per_session: update.price_per_session.unwrap_or_default(),
        available_days: update.available_days.unwrap_or_default(),
        available_start: update.available_start.unwrap_or_default(),
        available_end: update.available_end.unwrap_or_default(),
        photo: update.photo,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> ProfileFields {
        ProfileFields {
            name: Some(" Sari Dewi ".to_string()),
            specialization: Some("Sports nutrition".to_string()),
            experience_years: Some(5),
            bio: Some("Registered dietitian".to_string()),
            price_per_session: Some(150_000),
            available_days: Some(vec!["Monday".to_string(), "wednesday".to_string()]),
            available_hours: Some(AvailableHours {
                start: "09:00".to_string(),
                end: "17:00".to_string(),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn new_profile_is_normalized() {
        let profile = build_new(4, complete()).unwrap();
        assert_eq!(profile.user_id, 4);
        assert_eq!(profile.name, "Sari Dewi");
        assert_eq!(profile.available_days, "monday,wednesday");
        assert_eq!(profile.available_start, "09:00");
        assert!(profile.license.is_none());
    }

    #[test]
    fn new_profile_lists_missing_fields() {
        let fields = ProfileFields {
            name: Some("Sari".to_string()),
            bio: Some("   ".to_string()),
            ..Default::default()
        };
        let err = build_new(4, fields).unwrap_err().to_string();
        assert!(err.contains("specialization"));
        assert!(err.contains("bio"));
        assert!(err.contains("available_hours"));
        assert!(err.contains("available_days"));
        assert!(!err.contains("name"));
    }

    #[test]
    fn new_profile_needs_at_least_one_day() {
        let fields = ProfileFields {
            available_days: Some(Vec::new()),
            ..complete()
        };
        let err = build_new(4, fields).unwrap_err().to_string();
        assert_eq!(err, "Missing required fields: available_days");
    }

    #[test]
    fn update_rejects_bad_values() {
        let hours = ProfileFields {
            available_hours: Some(AvailableHours {
                start: "17:00".to_string(),
                end: "09:00".to_string(),
            }),
            ..Default::default()
        };
        assert!(build_update(hours).is_err());

        let years = ProfileFields {
            experience_years: Some(-1),
            ..Default::default()
        };
        assert!(build_update(years).is_err());

        let days = ProfileFields {
            available_days: Some(vec!["someday".to_string()]),
            ..Default::default()
        };
        assert!(build_update(days).is_err());
    }

    #[test]
    fn partial_update_touches_only_given_fields() {
        let update = build_update(ProfileFields {
            price_per_session: Some(200_000),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(update.price_per_session, Some(200_000));
        assert!(update.name.is_none());
        assert!(update.available_start.is_none());
    }
}
