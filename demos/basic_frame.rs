//! Basic TypedFrame usage: build columns, mix numeric kinds, filter rows.

use typedframe::*;

fn main() -> Result<()> {
    let ids = Column::new("id", (1..=5).map(Some));
    let quantity = Column::new("quantity", vec![Some(3i16), Some(10), None, Some(7), Some(1)]);
    let price = Column::new(
        "price",
        vec![Some(2.5f64), Some(0.99), Some(12.0), Some(4.25), Some(100.0)],
    );

    // int16 * float64 widens to float64; the null quantity stays null
    let total = quantity.multiply(&price)?.rename("total");
    println!("total is {} with {} nulls", total.element_type(), total.null_count());

    let mut table = Table::from_columns(vec![ids, quantity, price, total])?;
    table.append_row(vec![
        ColumnValue::Int32(6),
        ColumnValue::Int16(2),
        ColumnValue::Float64(8.0),
        ColumnValue::Float64(16.0),
    ])?;

    println!("Schema:");
    for (name, kind) in table.schema().iter() {
        println!("  {} ({})", name, kind);
    }

    let expensive = table.column("total")?.elementwise_greater_than_scalar(10.0)?;
    let selected = table.filter(&expensive)?;
    println!("\nRows with total > 10:");
    for row in selected.rows() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("  {}", cells.join(", "));
    }

    if let Some(sum) = table.column("total")?.sum()? {
        println!("\nSum of totals: {}", sum);
    }

    // integer division by zero is an error and leaves the column untouched
    let mut counts = table.column("quantity")?.clone();
    match counts.divide_scalar_in_place(0i16) {
        Ok(()) => println!("unexpected success"),
        Err(e) => println!("\nDivide by zero rejected: {}", e),
    }

    println!("\n{}", table.to_json()?);
    Ok(())
}
