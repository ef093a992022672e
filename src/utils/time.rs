//! Conversión de marcas de tiempo
//!
//! Los instantes se almacenan y transmiten en UTC. Las superficies de edición
//! trabajan con la hora de pared local en formato `YYYY-MM-DDTHH:MM`.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDateTime, TimeZone, Utc};

use crate::utils::errors::{validation_error, AppResult};

/// Formato de entrada `datetime-local`
pub const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

const LOCAL_INPUT_FORMAT_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// Convertir un instante almacenado a hora de pared en la zona `tz`
pub fn to_local_input<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    instant
        .with_timezone(tz)
        .format(LOCAL_INPUT_FORMAT)
        .to_string()
}

/// Convertir hora de pared en la zona `tz` a un instante UTC.
///
/// En un solapamiento (fin de horario de verano) se toma el instante más temprano.
pub fn from_local_input<Tz: TimeZone>(value: &str, tz: &Tz) -> AppResult<DateTime<Utc>> {
    let trimmed = value.trim();
    let naive = NaiveDateTime::parse_from_str(trimmed, LOCAL_INPUT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, LOCAL_INPUT_FORMAT_SECONDS))
        .map_err(|_| validation_error("timestamp", "expected YYYY-MM-DDTHH:MM"))?;

    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Ok(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Ok(earliest.with_timezone(&Utc)),
        LocalResult::None => Err(validation_error(
            "timestamp",
            "local time does not exist in this timezone",
        )),
    }
}

/// Instante → hora de pared de la zona local del proceso
pub fn display_local(instant: &DateTime<Utc>) -> String {
    to_local_input(instant, &Local)
}

/// Hora de pared de la zona local del proceso → instante
pub fn parse_local(value: &str) -> AppResult<DateTime<Utc>> {
    from_local_input(value, &Local)
}

/// Formato corto para tablas: `dd/mm/aaaa HH:MM` en hora local
pub fn format_short(instant: &DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%d/%m/%Y %H:%M")
        .to_string()
}

/// Formatear una duración como `2h 05min`
pub fn format_duration(duration: &Duration) -> String {
    let total_minutes = duration.num_minutes().max(0);
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 {
        format!("{}h {:02}min", hours, minutes)
    } else {
        format!("{}min", minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn sao_paulo() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_round_trip_fixed_offset() {
        let tz = sao_paulo();
        for input in [
            "2024-01-15T08:30",
            "2024-02-29T23:59",
            "2024-12-31T00:00",
            "2023-07-04T12:05",
        ] {
            let instant = from_local_input(input, &tz).unwrap();
            assert_eq!(to_local_input(&instant, &tz), input);
        }
    }

    #[test]
    fn test_local_input_is_stored_as_utc() {
        let instant = from_local_input("2024-01-15T08:30", &sao_paulo()).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-01-15T11:30:00+00:00");
    }

    #[test]
    fn test_round_trip_process_local_zone() {
        let input = "2024-06-15T14:30";
        let instant = parse_local(input).unwrap();
        assert_eq!(display_local(&instant), input);
    }

    #[test]
    fn test_accepts_seconds() {
        let instant = from_local_input("2024-01-15T08:30:45", &Utc).unwrap();
        assert_eq!(to_local_input(&instant, &Utc), "2024-01-15T08:30");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(from_local_input("15/01/2024 08:30", &Utc).is_err());
        assert!(from_local_input("", &Utc).is_err());
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(&Duration::minutes(125)), "2h 05min");
        assert_eq!(format_duration(&Duration::minutes(42)), "42min");
        assert_eq!(format_duration(&Duration::minutes(-5)), "0min");
    }
}
