use serde_json::{Value, json};

/// The classic bookstore document
pub fn bookstore() -> Value {
    json!({
        "store": {
            "book": [
                {
                    "category": "reference",
                    "author": "Nigel Rees",
                    "title": "Sayings of the Century",
                    "price": 8.95
                },
                {
                    "category": "fiction",
                    "author": "Evelyn Waugh",
                    "title": "Sword of Honour",
                    "price": 12.99
                },
                {
                    "category": "fiction",
                    "author": "Herman Melville",
                    "title": "Moby Dick",
                    "isbn": "0-553-21311-3",
                    "price": 8.99
                },
                {
                    "category": "fiction",
                    "author": "J. R. R. Tolkien",
                    "title": "The Lord of the Rings",
                    "isbn": "0-395-19395-8",
                    "price": 22.99
                }
            ],
            "bicycle": {
                "color": "red",
                "price": 19.95
            }
        },
        "expensive": 10
    })
}

/// Records with a mix of numeric, string and missing fields
pub fn inventory() -> Value {
    json!({
        "items": [
            { "sku": "a1", "qty": 4, "sizes": ["S", "M"], "tags": ["sale"] },
            { "sku": "b2", "qty": "4", "sizes": ["L"], "tags": [] },
            { "sku": "c3", "sizes": ["S", "M", "L"], "tags": ["new", "sale"] },
            { "sku": "d4", "qty": 0, "sizes": [], "tags": ["new"] }
        ],
        "readings": [[1, 2, 3, 4], [2.5, 3.5], ["n/a", 1], []]
    })
}

/// A document nested `depth` objects deep
pub fn nested(depth: usize) -> Value {
    (0..depth).fold(json!("leaf"), |inner, _| json!({ "child": inner }))
}
