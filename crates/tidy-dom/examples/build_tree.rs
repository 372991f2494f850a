//! Example: Build and reshape a small document tree

use tidy_dom::{DocumentFlavor, DomTree};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let mut tree = DomTree::new();
    let doc = tree.create_document(DocumentFlavor::Xml);

    let book = tree.create_element(doc, "book")?;
    tree.append_child(doc, book)?;

    let title = tree.create_element(doc, "title")?;
    let text = tree.create_text_node(doc, "The DOM, ")?;
    let more = tree.create_text_node(doc, "Level 2")?;
    tree.append_child(title, text)?;
    tree.append_child(title, more)?;
    tree.append_child(book, title)?;
    tree.set_attribute(book, "lang", "en")?;

    tree.normalize(doc)?;
    println!(
        "title: {:?}",
        tree.node_value(tree.first_child(title).unwrap())?
    );

    let titles = tree.get_elements_by_tag_name(doc, "title");
    println!("matching elements: {}", titles.length(&tree));

    let copy = tree.clone_node(book, true)?;
    println!(
        "clone has {} child(ren), original untouched: {}",
        tree.children(copy).len(),
        tree.children(book).len()
    );

    Ok(())
}
