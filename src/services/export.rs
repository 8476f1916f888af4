use crate::models::Booking;

const HEADER: &str = "Reference,Field,Date,Time,Status,Payment Type";

fn csv_value(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Renders bookings as CSV, one row per booking after the header line.
pub fn bookings_csv(bookings: &[Booking]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');

    for booking in bookings {
        let field = booking.field.as_ref().map_or("N/A", |f| f.name.as_str());
        let row = [
            csv_value(&booking.reference),
            csv_value(field),
            booking.date.format("%Y-%m-%d").to_string(),
            booking.time_range(),
            booking.status.as_str().to_string(),
            booking.payment_type.as_str().to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::booking::tests::booking;
    use crate::models::field::tests::field;
    use crate::models::BookingStatus;

    #[test]
    fn test_bookings_csv() {
        let mut approved = booking("1", BookingStatus::Approved, "2025-09-15", 18);
        approved.field = Some(field("1", "Stadium Khouribga", 150));
        let orphan = booking("2", BookingStatus::Pending, "2025-09-20", 9);

        let csv = bookings_csv(&[approved, orphan]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Reference,Field,Date,Time,Status,Payment Type");
        assert!(lines[1].contains(",Stadium Khouribga,2025-09-15,18:00-19:00,approved,"));
        assert!(lines[2].contains(",N/A,2025-09-20,9:00-10:00,pending,"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_values_with_commas_are_quoted() {
        assert_eq!(csv_value("Terrain, Nord"), "\"Terrain, Nord\"");
        assert_eq!(csv_value("Le \"Stade\""), "\"Le \"\"Stade\"\"\"");
        assert_eq!(csv_value("plain"), "plain");
    }

    #[test]
    fn test_empty_export_is_header_only() {
        assert_eq!(bookings_csv(&[]), format!("{HEADER}\n"));
    }
}
