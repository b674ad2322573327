use reldb::*;

fn main() -> Result<(), DbError> {
    println!("Relational Table Engine Demo\n");

    // Define and load two tables through the engine
    let mut db = Database::new();
    db.define("emp", &["int", "string", "int"])?;
    db.define("dept", &["int", "string"])?;

    let rows = db.load(
        true,
        "emp",
        "id,name,dept\n3,carol,20\n1,alice,10\n2,bob,30\n".as_bytes(),
    )?;
    println!("Loaded {rows} rows into emp");
    let rows = db.load(true, "dept", "dept,title\n10,ops\n20,dev\n".as_bytes())?;
    println!("Loaded {rows} rows into dept\n");

    // Operators return new tables; store the ones worth keeping
    let joined = db.natural_join("emp", "dept", true)?;
    println!("outer naturaljoin(emp, dept):\n{joined}");
    db.insert("staff", joined);

    let sorted = db.order_by("staff", &"name".into())?;
    println!("orderby(staff, name):\n{sorted}");

    let missing = db.check("emp", &"dept".into(), "dept", &"dept".into())?;
    println!("emp rows with no matching dept:\n{missing}");

    // The same engine driven by command lines
    let mut session = Session::default();
    for line in ["define t (int, string)", "x = rows(t, 0, >, 1)", "print t"] {
        match session.execute(line) {
            Ok(Outcome::Message(text)) => println!("{line}\n  -> {}", text.trim_end()),
            Ok(Outcome::Exit) => break,
            Err(e) => println!("{line}\n  -> error: {e}"),
        }
    }

    Ok(())
}
