use std::fs::File;
use std::io::Error;
use std::path::Path;

pub fn write_tsv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<(), Error> {
    let file = File::create(path)?;
    let mut wtr = csv::WriterBuilder::new().delimiter(b'\t').from_writer(file);
    wtr.write_record(header)?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_rentals(path: &Path, rows: &[Vec<String>]) -> Result<(), Error> {
    write_tsv(
        path,
        &["game_id", "rental_start", "rental_end", "customer_id"],
        rows,
    )
}
