//! Load CSV text with type sniffing, transform it and write it back out.

use typedframe::*;

const INPUT: &str = "\
city,population,founded,capital
\"Springfield, IL\",116250,1821-04-11,true
Shelbyville,,1840-07-04,false
\"\",42,1901-01-01 08:00:00,false
";

fn main() -> Result<()> {
    let table = load_csv_from_str(INPUT, &CsvOptions::default())?;
    for (name, kind) in table.schema().iter() {
        println!("{:<12} {}", name, kind);
    }

    // an empty quoted field is an empty string, an empty unquoted one is null
    println!("row 2 city: {:?}", table.get_value(2, "city")?);
    println!("row 1 population: {:?}", table.get_value(1, "population")?);

    let options = CsvOptions {
        separator: ';',
        ..CsvOptions::default()
    };
    let text = to_csv_string(&table, &options)?;
    println!("\n{}", text);

    let reloaded = load_csv_from_str(&text, &options)?;
    assert_eq!(reloaded.len(), table.len());
    assert_eq!(reloaded.get_value(2, "city")?, ColumnValue::from(""));
    assert!(reloaded.get_value(1, "population")?.is_null());
    println!("round trip preserved {} rows", reloaded.len());
    Ok(())
}

