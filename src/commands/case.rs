use chrono::{DateTime, TimeDelta, Utc};

use super::CaseQuery;
use crate::cases::CaseRecord;
use crate::parse::CaseNumber;

const NOT_PROVIDED: &str = "not provided";

/// Render the reply for a case query against a record that exists.
pub fn render(
    query: CaseQuery,
    number: &CaseNumber,
    record: &CaseRecord,
    now: DateTime<Utc>,
) -> String {
    match query {
        CaseQuery::Title => format!("Title for SR {} is: {}", number, field(&record.title)),
        CaseQuery::Description => format!(
            "Problem description for SR {} is: <br>{}",
            number,
            field(&record.problem_desc)
        ),
        CaseQuery::Owner => owner(number, record),
        CaseQuery::Contract => format!(
            "The contract number used to open SR {} is: {}",
            number,
            field(&record.contract_id)
        ),
        CaseQuery::Customer => customer(number, record),
        CaseQuery::Status => format!(
            "Status for SR {} is {} and Severity is {}",
            number,
            field(&record.status),
            field(&record.severity)
        ),
        CaseQuery::Rma => rmas(number, record),
        CaseQuery::Device => device(number, record),
        CaseQuery::Created => created(number, record, now),
        CaseQuery::Updated => updated(number, record, now),
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(NOT_PROVIDED)
}

fn owner(number: &CaseNumber, record: &CaseRecord) -> String {
    let contact = record
        .owner_email_address
        .as_deref()
        .or(record.owner_user_id.as_deref())
        .unwrap_or(NOT_PROVIDED);
    format!(
        "Case owner for SR {} is: {} ({})",
        number,
        full_name(&record.owner_first_name, &record.owner_last_name),
        contact
    )
}

/// First and last name joined by whichever parts are present.
fn full_name(first: &Option<String>, last: &Option<String>) -> String {
    let parts: Vec<&str> = [first, last].into_iter().flatten().map(String::as_str).collect();
    if parts.is_empty() {
        NOT_PROVIDED.to_string()
    } else {
        parts.join(" ")
    }
}

fn customer(number: &CaseNumber, record: &CaseRecord) -> String {
    let mut message = format!(
        "Customer contact for SR {} is: <br>{}",
        number,
        full_name(
            &record.contact_user_first_name,
            &record.contact_user_last_name
        )
    );

    if let Some(id) = &record.contact_user_id {
        message.push_str(&format!("<br>CCO ID: {}", id));
    }
    let optional = [
        ("Email", &record.contact_email_ids),
        ("Business phone", &record.contact_business_phone_numbers),
        ("Mobile phone", &record.contact_mobile_phone_numbers),
    ];
    for (label, values) in optional {
        if !values.is_empty() {
            message.push_str(&format!("<br>{}: {}", label, values.join(", ")));
        }
    }
    message
}

fn rmas(number: &CaseNumber, record: &CaseRecord) -> String {
    match record.rmas.as_slice() {
        [] => format!("There are no RMAs for SR {}", number),
        [single] => format!("The RMA for SR {} is: {}", number, single),
        many => format!("The RMAs for SR {} are: {}", number, many.join(", ")),
    }
}

fn device(number: &CaseNumber, record: &CaseRecord) -> String {
    let serial = match &record.serial_number {
        Some(serial) => format!("Device serial number for SR {} is: {}", number, serial),
        None => "Device serial number not provided".to_string(),
    };
    let hostname = match &record.device_name {
        Some(host) => format!("Device hostname is {}", host),
        None => "Device hostname not provided".to_string(),
    };
    format!("{}<br>{}", serial, hostname)
}

fn created(number: &CaseNumber, record: &CaseRecord, now: DateTime<Utc>) -> String {
    let Some(created_at) = record.created_at() else {
        return format!("Creation date for SR {} not provided", number);
    };

    let mut message = format!(
        "Creation date for SR {} is: {}",
        number,
        display_date(created_at)
    );
    if !record.is_closed() {
        message.push_str(&format!(
            "<br>Case has been open for {}",
            format_elapsed(now - created_at)
        ));
    }
    message
}

fn updated(number: &CaseNumber, record: &CaseRecord, now: DateTime<Utc>) -> String {
    let Some(updated_at) = record.updated_at() else {
        return format!("Last update for SR {} not provided", number);
    };

    let elapsed = now - updated_at;
    let mut message = format!(
        "Last update for SR {} was: {}",
        number,
        display_date(updated_at)
    );
    if record.is_closed() {
        message.push_str(&format!(
            "<br>Case is closed, {} since case closure",
            format_elapsed(elapsed)
        ));
    } else if elapsed > TimeDelta::days(3) {
        message.push_str(&format!(
            "<br><b>{} since last update</b>",
            format_elapsed(elapsed)
        ));
    } else {
        message.push_str(&format!("<br>{} since last update", format_elapsed(elapsed)));
    }
    message
}

fn display_date(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `3 days, 4:05:06`, `1 day, 0:00:10` or `4:05:06`. Negative spans render as zero.
pub fn format_elapsed(elapsed: TimeDelta) -> String {
    let total = elapsed.num_seconds().max(0);
    let days = total / 86_400;
    let rest = total % 86_400;
    let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);
    match days {
        0 => clock,
        1 => format!("1 day, {}", clock),
        n => format!("{} days, {}", n, clock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn number() -> CaseNumber {
        "681234567".parse().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2017, 3, 10, 12, 0, 0).unwrap()
    }

    fn record() -> CaseRecord {
        CaseRecord {
            title: Some("Core switch reloads".to_string()),
            problem_desc: Some("Switch reloads every night".to_string()),
            owner_user_id: Some("adalove".to_string()),
            owner_first_name: Some("Ada".to_string()),
            owner_last_name: Some("Lovelace".to_string()),
            owner_email_address: Some("adalove@cisco.com".to_string()),
            contract_id: Some("91234567".to_string()),
            status: Some("Customer Updated".to_string()),
            severity: Some("3".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_title_and_description() {
        let r = record();
        assert_eq!(
            render(CaseQuery::Title, &number(), &r, now()),
            "Title for SR 681234567 is: Core switch reloads"
        );
        assert_eq!(
            render(CaseQuery::Description, &number(), &r, now()),
            "Problem description for SR 681234567 is: <br>Switch reloads every night"
        );
    }

    #[test]
    fn test_owner_with_missing_names() {
        let r = CaseRecord {
            owner_user_id: Some("adalove".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Owner, &number(), &r, now()),
            "Case owner for SR 681234567 is: not provided (adalove)"
        );

        let r = CaseRecord {
            owner_last_name: Some("Lovelace".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Owner, &number(), &r, now()),
            "Case owner for SR 681234567 is: Lovelace (not provided)"
        );
        assert_eq!(
            render(CaseQuery::Customer, &number(), &CaseRecord::default(), now()),
            "Customer contact for SR 681234567 is: <br>not provided"
        );
    }

    #[test]
    fn test_owner_contract_status() {
        let r = record();
        assert_eq!(
            render(CaseQuery::Owner, &number(), &r, now()),
            "Case owner for SR 681234567 is: Ada Lovelace (adalove@cisco.com)"
        );
        assert_eq!(
            render(CaseQuery::Contract, &number(), &r, now()),
            "The contract number used to open SR 681234567 is: 91234567"
        );
        assert_eq!(
            render(CaseQuery::Status, &number(), &r, now()),
            "Status for SR 681234567 is Customer Updated and Severity is 3"
        );
    }

    #[test]
    fn test_missing_title_is_not_provided() {
        let r = CaseRecord::default();
        assert_eq!(
            render(CaseQuery::Title, &number(), &r, now()),
            "Title for SR 681234567 is: not provided"
        );
    }

    #[test]
    fn test_customer_accumulates_present_fields() {
        let r = CaseRecord {
            contact_user_id: Some("gh123".to_string()),
            contact_user_first_name: Some("Grace".to_string()),
            contact_user_last_name: Some("Hopper".to_string()),
            contact_email_ids: vec!["grace@example.com".to_string()],
            contact_mobile_phone_numbers: vec!["+1 555 0100".to_string()],
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Customer, &number(), &r, now()),
            "Customer contact for SR 681234567 is: <br>Grace Hopper\
             <br>CCO ID: gh123<br>Email: grace@example.com<br>Mobile phone: +1 555 0100"
        );
    }

    #[test]
    fn test_customer_omits_absent_fields() {
        let r = CaseRecord {
            contact_user_first_name: Some("Grace".to_string()),
            contact_user_last_name: Some("Hopper".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Customer, &number(), &r, now()),
            "Customer contact for SR 681234567 is: <br>Grace Hopper"
        );
    }

    #[test]
    fn test_rma_phrasing() {
        let mut r = CaseRecord {
            rmas: vec!["A1".to_string(), "A2".to_string()],
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Rma, &number(), &r, now()),
            "The RMAs for SR 681234567 are: A1, A2"
        );

        r.rmas = vec!["A1".to_string()];
        assert_eq!(
            render(CaseQuery::Rma, &number(), &r, now()),
            "The RMA for SR 681234567 is: A1"
        );

        r.rmas.clear();
        assert_eq!(
            render(CaseQuery::Rma, &number(), &r, now()),
            "There are no RMAs for SR 681234567"
        );
    }

    #[test]
    fn test_device_lines() {
        let mut r = CaseRecord {
            serial_number: Some("FOC1234X0AB".to_string()),
            device_name: Some("core-sw-01".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Device, &number(), &r, now()),
            "Device serial number for SR 681234567 is: FOC1234X0AB<br>Device hostname is core-sw-01"
        );

        r.serial_number = None;
        assert_eq!(
            render(CaseQuery::Device, &number(), &r, now()),
            "Device serial number not provided<br>Device hostname is core-sw-01"
        );

        r.device_name = None;
        assert_eq!(
            render(CaseQuery::Device, &number(), &r, now()),
            "Device serial number not provided<br>Device hostname not provided"
        );
    }

    #[test]
    fn test_created_open_case() {
        let r = CaseRecord {
            status: Some("Customer Pending".to_string()),
            creation_date: Some("2017-03-01T10:30:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Created, &number(), &r, now()),
            "Creation date for SR 681234567 is: 2017-03-01 10:30:00\
             <br>Case has been open for 9 days, 1:30:00"
        );
    }

    #[test]
    fn test_created_closed_case_has_no_duration() {
        let r = CaseRecord {
            status: Some("Closed".to_string()),
            creation_date: Some("2017-03-01T10:30:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Created, &number(), &r, now()),
            "Creation date for SR 681234567 is: 2017-03-01 10:30:00"
        );
    }

    #[test]
    fn test_created_without_date() {
        assert_eq!(
            render(CaseQuery::Created, &number(), &CaseRecord::default(), now()),
            "Creation date for SR 681234567 not provided"
        );
    }

    #[test]
    fn test_updated_closed_case() {
        let r = CaseRecord {
            status: Some("Closed".to_string()),
            updated_date: Some("2017-03-09T12:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Updated, &number(), &r, now()),
            "Last update for SR 681234567 was: 2017-03-09 12:00:00\
             <br>Case is closed, 1 day, 0:00:00 since case closure"
        );
    }

    #[test]
    fn test_updated_stale_case_is_bold() {
        let r = CaseRecord {
            status: Some("Customer Pending".to_string()),
            updated_date: Some("2017-03-05T08:00:00Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Updated, &number(), &r, now()),
            "Last update for SR 681234567 was: 2017-03-05 08:00:00\
             <br><b>5 days, 4:00:00 since last update</b>"
        );
    }

    #[test]
    fn test_updated_recent_case_is_plain() {
        let r = CaseRecord {
            status: Some("Customer Pending".to_string()),
            updated_date: Some("2017-03-10T09:15:30Z".to_string()),
            ..Default::default()
        };
        assert_eq!(
            render(CaseQuery::Updated, &number(), &r, now()),
            "Last update for SR 681234567 was: 2017-03-10 09:15:30\
             <br>2:44:30 since last update"
        );
    }

    #[test]
    fn test_updated_exactly_three_days_is_plain() {
        let r = CaseRecord {
            updated_date: Some("2017-03-07T12:00:00Z".to_string()),
            ..Default::default()
        };
        assert!(render(CaseQuery::Updated, &number(), &r, now())
            .ends_with("<br>3 days, 0:00:00 since last update"));
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(TimeDelta::seconds(0)), "0:00:00");
        assert_eq!(format_elapsed(TimeDelta::seconds(3_725)), "1:02:05");
        assert_eq!(format_elapsed(TimeDelta::seconds(86_410)), "1 day, 0:00:10");
        assert_eq!(
            format_elapsed(TimeDelta::days(3) + TimeDelta::seconds(14_706)),
            "3 days, 4:05:06"
        );
        assert_eq!(format_elapsed(TimeDelta::seconds(-30)), "0:00:00");
    }
}
