//! Builds a skiplist from shuffled input, then copies and moves it around,
//! printing the structure after each step.
//!
//! Run with `cargo run --example shuffle`.

use std::time::Instant;

use rand::seq::SliceRandom;
use skipset::SkipList;

const SIZE: i32 = 100;

fn main() {
    // 1..=SIZE, except that the middle value is replaced by 0 so that one
    // value in range is known to be missing.
    let missing = SIZE / 2 + 1;
    let mut values: Vec<i32> = (1..=SIZE).map(|v| if v == missing { 0 } else { v }).collect();
    println!("Created {SIZE} values; {missing} is deliberately absent.");

    values.shuffle(&mut rand::rng());
    println!("Shuffled the values, they will be inserted in random order.");

    let mut s = SkipList::new();
    let quarter = values.len() / 4;
    let start = Instant::now();
    for (i, &v) in values.iter().enumerate() {
        s.insert(v);
        if (i + 1) % quarter == 0 {
            println!("{}% of elements inserted.", (i + 1) / quarter * 25);
        }
    }
    println!(
        "Inserted {} elements in {:?} (max level {}, height {}).",
        s.len(),
        start.elapsed(),
        s.max_level(),
        s.height()
    );

    let mut p = s.clone();
    let mut q = SkipList::new();
    q.clone_from(&p);
    let t = q.take_all();
    println!("{}", p.levels());
    let o = p.take_all();
    println!("{}", o.levels());

    println!("p, q (moved from):");
    println!("[{p}]");
    println!("[{q}]");
    println!("o, t:");
    println!("{o}");
    println!("{t}");

    let mut cursor = s.begin();
    while cursor != s.end() {
        print!("{} -> ", cursor.value());
        cursor.move_next();
    }
    println!();

    println!("for loop:");
    for x in &s {
        print!("{x} -> ");
    }
    println!();

    println!("40 is in the list: {}", s.find(&40) != s.end());
    println!("{missing} is in the list: {}", s.contains(&missing));
    println!("120 is in the list: {}", s.find(&120) != s.end());
}
