use crate::sql::base::error::DbError;
use chrono::{Datelike, Timelike};
use model::core::value::Value;
use mysql_async::{Params, Value as MySqlValue};

pub struct MySqlParam(MySqlValue);

impl MySqlParam {
    /// Maps a bindable value onto the driver's wire value. Nested containers
    /// have no SQL representation and are rejected.
    pub fn from_value(value: &Value) -> Result<Self, DbError> {
        let param = match value {
            Value::Null => MySqlValue::NULL,
            Value::Boolean(b) => MySqlValue::Int(if *b { 1 } else { 0 }),
            Value::Int(i) => MySqlValue::Int(*i),
            Value::Uint(u) => MySqlValue::UInt(*u),
            Value::Float(f) => MySqlValue::Double(*f),
            Value::String(s) => MySqlValue::Bytes(s.clone().into_bytes()),
            Value::Bytes(b) => MySqlValue::Bytes(b.clone()),
            Value::Timestamp(ts) => {
                let naive = ts.naive_utc();
                MySqlValue::Date(
                    naive.year() as u16,
                    naive.month() as u8,
                    naive.day() as u8,
                    naive.hour() as u8,
                    naive.minute() as u8,
                    naive.second() as u8,
                    ts.timestamp_subsec_micros(),
                )
            }
            Value::Array(_) | Value::Map(_) => return Err(DbError::UnsupportedParam(value.kind())),
        };
        Ok(MySqlParam(param))
    }
}

pub struct MySqlParamStore {
    pub params: Vec<MySqlParam>,
}

impl MySqlParamStore {
    pub fn from_values(values: &[Value]) -> Result<Self, DbError> {
        let params = values
            .iter()
            .map(MySqlParam::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(MySqlParamStore { params })
    }

    pub fn params(self) -> Params {
        if self.params.is_empty() {
            return Params::Empty;
        }
        Params::Positional(self.params.into_iter().map(|p| p.0).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_scalar_params() {
        let store = MySqlParamStore::from_values(&[
            Value::Int(7),
            Value::from("AB"),
            Value::Null,
            Value::Boolean(true),
        ])
        .unwrap();

        match store.params() {
            Params::Positional(values) => assert_eq!(
                values,
                vec![
                    MySqlValue::Int(7),
                    MySqlValue::Bytes(b"AB".to_vec()),
                    MySqlValue::NULL,
                    MySqlValue::Int(1),
                ]
            ),
            other => panic!("unexpected params: {other:?}"),
        }
    }

    #[test]
    fn test_timestamp_param() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 12).unwrap();
        let MySqlParam(value) = MySqlParam::from_value(&Value::Timestamp(ts)).unwrap();
        assert_eq!(value, MySqlValue::Date(2024, 5, 17, 8, 30, 12, 0));
    }

    #[test]
    fn test_composite_params_are_rejected() {
        let err = MySqlParam::from_value(&Value::Map(vec![])).err().unwrap();
        assert!(matches!(err, DbError::UnsupportedParam("map")));
    }
}
