use std::io::Write;

use serde_json::Value;

use crate::error::CliError;

/// Write one JSON document to stdout.
pub fn render(data: &Value, pretty: bool) -> Result<(), CliError> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    write_json(&mut handle, data, pretty)
}

fn write_json<W: Write>(writer: &mut W, data: &Value, pretty: bool) -> Result<(), CliError> {
    if pretty {
        serde_json::to_writer_pretty(&mut *writer, data)?;
    } else {
        serde_json::to_writer(&mut *writer, data)?;
    }
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn compact_output_is_one_line() {
        let mut buffer = Vec::new();

        write_json(&mut buffer, &json!({"banks": ["SAMPATH"]}), false).expect("write");

        assert_eq!(String::from_utf8(buffer).expect("utf8"), "{\"banks\":[\"SAMPATH\"]}\n");
    }

    #[test]
    fn pretty_output_is_indented() {
        let mut buffer = Vec::new();

        write_json(&mut buffer, &json!({"stored": []}), true).expect("write");

        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            "{\n  \"stored\": []\n}\n"
        );
    }
}
