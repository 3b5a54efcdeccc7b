//! Round trips of a small object graph: a library holding books.

use pretty_assertions::assert_eq;
use xml_model::xml::{self, Config, Indent};
use xml_model::{reflect_class, ModelOptions};

mod helpers;
use helpers::{init_tracing, roundtrip};

#[derive(Clone, Debug, PartialEq)]
struct Book {
    name: String,
    nb_pages: f64,
}
reflect_class!(Book { name: String, nb_pages: f64 });

#[derive(Clone, Debug, PartialEq)]
struct Library {
    name: String,
    books: Vec<Book>,
}
reflect_class!(Library { name: String, books: Vec<Book> });

fn setup() {
    init_tracing();
    xml_model::model(ModelOptions::<Book>::new().from_xml(|ctx, _next| {
        let mut record = ctx.properties()?;
        Ok(Book {
            name: record.take("name")?,
            nb_pages: record.take("nb_pages")?,
        })
    }));
    xml_model::model(ModelOptions::<Library>::new().from_xml(|ctx, _next| {
        let mut record = ctx.properties()?;
        Ok(Library {
            name: record.take("name")?,
            books: record.take("books")?,
        })
    }));
}

fn book(name: &str, nb_pages: f64) -> Book {
    Book {
        name: name.to_owned(),
        nb_pages,
    }
}

fn library() -> Library {
    Library {
        name: "test".to_owned(),
        books: vec![book("Book #1", 10.0), book("Book #2", 100.0)],
    }
}

const LIBRARY: &str = "\
    <library>\
        <name>test</name>\
        <books>\
            <book><name>Book #1</name><nb-pages>10</nb-pages></book>\
            <book><name>Book #2</name><nb-pages>100</nb-pages></book>\
        </books>\
    </library>";

#[test]
fn library_roundtrip() {
    setup();
    let library = library();
    assert_eq!(roundtrip(&library, LIBRARY), library);
}

#[test]
fn single_book() {
    setup();
    let book = book("Dune", 412.0);
    assert_eq!(
        roundtrip(&book, "<book><name>Dune</name><nb-pages>412</nb-pages></book>"),
        book
    );
}

#[test]
fn empty_library() {
    setup();
    let library = Library {
        name: "empty".to_owned(),
        books: Vec::new(),
    };
    assert_eq!(
        roundtrip(&library, "<library><name>empty</name><books/></library>"),
        library
    );
}

/// Whitespace is dropped between elements only, text content made of spaces
/// is a value.
#[test]
fn blank_name() {
    setup();
    let book = book("   ", 1.0);
    assert_eq!(
        roundtrip(&book, "<book><name>   </name><nb-pages>1</nb-pages></book>"),
        book
    );

    let text = "<book>\n  <name>\n</name>\n  <nb-pages>1</nb-pages>\n</book>";
    let book = xml_model::from_str::<Book>(text).unwrap();
    assert_eq!(book.name, "\n");
}

/// Formatting of the input does not matter: whitespace between elements is
/// dropped by the parser.
#[test]
fn indented_input() {
    setup();
    let text = r#"<?xml version="1.0"?>
        <!-- books of the week -->
        <library>
            <name>test</name>
            <books>
                <book>
                    <name>Book #1</name>
                    <nb-pages>10</nb-pages>
                </book>
                <book>
                    <name>Book #2</name>
                    <nb-pages> 100 </nb-pages>
                </book>
            </books>
        </library>
    "#;
    assert_eq!(xml_model::from_str::<Library>(text).unwrap(), library());
}

#[test]
fn indented_output() {
    setup();
    let doc = xml_model::to_xml(&library()).unwrap();
    let mut config = Config::default();
    config.indent(Some(Indent::new(b' ', 2)));
    assert_eq!(
        xml::stringify_with(&doc, &config).unwrap(),
        "<library>
  <name>test</name>
  <books>
    <book>
      <name>Book #1</name>
      <nb-pages>10</nb-pages>
    </book>
    <book>
      <name>Book #2</name>
      <nb-pages>100</nb-pages>
    </book>
  </books>
</library>"
    );
}

/// Unknown elements are not selected by any property.
#[test]
fn unknown_elements_are_skipped() {
    setup();
    let text = "<book><isbn>123</isbn><name>Dune</name><nb-pages>412</nb-pages></book>";
    assert_eq!(xml_model::from_str::<Book>(text).unwrap(), book("Dune", 412.0));
}

/// A model can be used directly with a parsed tree.
#[test]
fn from_tree() {
    setup();
    let doc = xml::parse(LIBRARY).unwrap();
    let model = xml_model::get::<Library>().unwrap();
    assert_eq!(model.from_xml_as::<Library>(&doc).unwrap(), library());
    assert_eq!(model.to_xml(&library()).unwrap(), doc);
}
