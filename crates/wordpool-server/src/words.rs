//! CSV input for the maintenance subcommands.
//!
//! Word lists arrive either as one long row or one word per line; both read
//! the same way because every field of every record is taken.

use std::io::Read;

fn reader<R: Read>(input: R) -> csv::Reader<R> {
  csv::ReaderBuilder::new()
    .has_headers(false)
    .flexible(true)
    .trim(csv::Trim::All)
    .from_reader(input)
}

/// Every non-empty field of every record.
pub fn read_words<R: Read>(input: R) -> Result<Vec<String>, csv::Error> {
  let mut words = Vec::new();
  for record in reader(input).records() {
    let record = record?;
    words.extend(record.iter().filter(|f| !f.is_empty()).map(str::to_owned));
  }
  Ok(words)
}

/// The first non-empty field of each record, e.g. an address column.
pub fn read_first_fields<R: Read>(input: R) -> Result<Vec<String>, csv::Error> {
  let mut fields = Vec::new();
  for record in reader(input).records() {
    let record = record?;
    if let Some(first) = record.get(0).filter(|f| !f.is_empty()) {
      fields.push(first.to_owned());
    }
  }
  Ok(fields)
}
