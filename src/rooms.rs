use anyhow::Result;
use tracing::info;

use crate::commands::help_text;
use crate::parse::CaseNumber;
use crate::platform::MessagingPlatform;

/// Make sure `email` is in a room for the case and post the help listing
/// there. Returns one status line per step taken.
pub async fn provision_case_room(
    platform: &dyn MessagingPlatform,
    case_input: &str,
    email: &str,
) -> Result<String> {
    let Ok(case_number) = case_input.parse::<CaseNumber>() else {
        let message = format!("{} is not a valid case number", case_input);
        info!("{}", message);
        return Ok(message);
    };

    let Some(person_id) = platform.find_person_id(email).await? else {
        let message = format!("No user found with the email address: {}", email);
        info!("{}", message);
        return Ok(message);
    };

    let mut report = String::new();

    let existing = platform
        .list_rooms()
        .await?
        .into_iter()
        .find(|room| room.title.contains(case_number.as_str()));

    let room_id = match existing {
        Some(room) => {
            if platform.is_member(&room.id, email).await? {
                report.push_str(&format!(
                    "Room already exists with  {} in the title and {} already a member.\n",
                    case_number, email
                ));
                info!("Room {} already has {}", room.id, email);
            } else {
                add_member(platform, &room.id, &person_id, email, &mut report).await?;
            }
            room.id
        }
        None => {
            let room = platform.create_room(&format!("SR {}", case_number)).await?;
            report.push_str(&format!("Created roomId: {}\n", room.id));
            info!("Created room {} for SR {}", room.id, case_number);
            add_member(platform, &room.id, &person_id, email, &mut report).await?;
            room.id
        }
    };

    platform.send_to_room(&room_id, &help_text()).await?;
    report.push_str("Welcome message (with help command) sent to the room.\n");

    Ok(report)
}

async fn add_member(
    platform: &dyn MessagingPlatform,
    room_id: &str,
    person_id: &str,
    email: &str,
    report: &mut String,
) -> Result<()> {
    let membership_id = platform.add_member(room_id, person_id).await?;
    info!("Membership {} created for {}", membership_id, email);
    report.push_str(&format!("{} added to the room.\n", email));
    Ok(())
}
