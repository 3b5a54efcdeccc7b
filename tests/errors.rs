//! Registry failures, mismatches and the wrapping of conversion errors.

use pretty_assertions::assert_eq;
use std::sync::{Arc, Once};
use xml_model::middleware::{resolve, Pipeline};
use xml_model::model::ModelFromXml;
use xml_model::reflect::Instance;
use xml_model::{
    prop, reflect_class, Direction, Error, ModelOptions, PropertyOptions, XmlError, XmlModel,
};

mod helpers;
use helpers::init_tracing;

#[derive(Debug, PartialEq)]
struct Book {
    name: String,
    nb_pages: f64,
}
reflect_class!(Book { name: String, nb_pages: f64 });

#[derive(Debug, PartialEq)]
struct Library {
    books: Vec<Book>,
}
reflect_class!(Library { books: Vec<Book> });

/// Registered without a constructor.
struct Shelf {
    label: String,
}
reflect_class!(Shelf { label: String });

/// Never registered.
struct Unregistered {
    id: u32,
}
reflect_class!(Unregistered { id: u32 });

#[derive(Debug)]
struct Stamp {
    code: String,
}
reflect_class!(Stamp { code: String });

fn setup() {
    static SETUP: Once = Once::new();
    init_tracing();
    SETUP.call_once(|| {
        xml_model::create(ModelOptions::<Book>::new().from_xml(|ctx, _next| {
            let mut record = ctx.properties()?;
            Ok(Book {
                name: record.take("name")?,
                nb_pages: record.take("nb_pages")?,
            })
        }))
        .unwrap();
        xml_model::create(ModelOptions::<Library>::new().from_xml(|ctx, _next| {
            let mut record = ctx.properties()?;
            Ok(Library {
                books: record.take("books")?,
            })
        }))
        .unwrap();
        xml_model::create(ModelOptions::<Shelf>::new()).unwrap();

        prop::<Stamp>(
            "code",
            PropertyOptions::new().from_xml(|ctx| {
                let code = ctx.elements.first().map_or("", |element| {
                    element.attribute("value").unwrap_or_default()
                });
                if code.len() != 3 {
                    return Err(Error::custom(format!("bad stamp code `{}`", code)));
                }
                Ok(Some(Box::new(code.to_owned()) as Instance))
            }),
        )
        .unwrap();
        xml_model::create(ModelOptions::<Stamp>::new().from_xml(|ctx, _next| {
            let mut record = ctx.properties()?;
            Ok(Stamp {
                code: record.take("code")?,
            })
        }))
        .unwrap();
    });
}

#[test]
fn lookup_failure() {
    setup();
    assert!(xml_model::find::<Unregistered>().is_none());
    let error = xml_model::get::<Unregistered>().unwrap_err();
    assert!(matches!(error, Error::ModelNotFound("Unregistered")));
    assert_eq!(error.to_string(), "couldn't find model for type Unregistered");

    let error = xml_model::to_string(&Unregistered { id: 1 }).unwrap_err();
    assert!(matches!(error, Error::ModelNotFound("Unregistered")));
}

#[test]
fn registration_conflict() {
    setup();
    let error = xml_model::create(ModelOptions::<Book>::new()).unwrap_err();
    assert!(matches!(error, Error::ModelExists("Book")));

    // Find-or-create returns the registered model
    let registered = xml_model::get::<Book>().unwrap();
    assert!(Arc::ptr_eq(
        &registered,
        &xml_model::model(ModelOptions::<Book>::new().tagname("other"))
    ));
    assert_eq!(registered.tagname(), "book");
}

#[test]
fn mismatch() {
    setup();
    let model = xml_model::get::<Book>().unwrap();
    let error = model.to_xml(&"plain string".to_string()).unwrap_err();
    assert!(matches!(error, Error::Mismatch { expected: "Book" }));

    // A detached model is bound to its class as well
    let detached = XmlModel::detached(ModelOptions::<Shelf>::new());
    let book = Book {
        name: "Dune".to_owned(),
        nb_pages: 412.0,
    };
    assert!(matches!(
        detached.to_xml(&book),
        Err(Error::Mismatch { expected: "Shelf" })
    ));
}

#[test]
fn from_xml_undefined() {
    setup();
    let model = xml_model::get::<Shelf>().unwrap();
    let error = model.from_xml("<shelf><label>A</label></shelf>").unwrap_err();
    match &error {
        Error::Model {
            class,
            direction,
            source,
        } => {
            assert_eq!(*class, "Shelf");
            assert_eq!(*direction, Direction::FromXml);
            assert!(matches!(**source, Error::FromXmlUndefined("Shelf")));
        }
        e => panic!("unexpected error {:?}", e),
    }

    // Encoding still works with the defaults
    let shelf = Shelf {
        label: "A".to_owned(),
    };
    assert_eq!(
        xml_model::to_string(&shelf).unwrap(),
        "<shelf><label>A</label></shelf>"
    );
}

/// Errors get the member context at the innermost property, and propagate
/// as-is through the enclosing models.
#[test]
fn wrapped_once() {
    setup();
    let text = "<library><books><book><name>A</name><nb-pages>many</nb-pages></book></books></library>";
    let error = xml_model::from_str::<Library>(text).unwrap_err();
    assert_eq!(
        error.to_string(),
        "failed to convert property Book.nb_pages from XML: \
         failed to convert f64 from XML: `many` is not a number"
    );
    match &error {
        Error::Property {
            class: "Book",
            property: "nb_pages",
            direction: Direction::FromXml,
            source,
        } => assert!(matches!(
            **source,
            Error::Model {
                class: "f64",
                direction: Direction::FromXml,
                ..
            }
        )),
        e => panic!("unexpected error {:?}", e),
    }
    assert!(matches!(error.root_cause(), Error::InvalidNumber(text) if text == "many"));
}

/// Scalar members name the member which failed.
#[test]
fn scalar_member() {
    setup();
    let error = xml_model::from_str::<Book>("<book><name><b/></name></book>").unwrap_err();
    assert!(matches!(
        error,
        Error::Property {
            class: "Book",
            property: "name",
            direction: Direction::FromXml,
            ..
        }
    ));
    assert!(matches!(
        error.root_cause(),
        Error::Xml(XmlError::NotText(name)) if name == "name"
    ));
    assert!(error
        .to_string()
        .starts_with("failed to convert property Book.name from XML: failed to convert String"));
}

#[test]
fn custom_error() {
    setup();
    let error = xml_model::from_str::<Stamp>(r#"<stamp><code value="AB"/></stamp>"#).unwrap_err();
    assert_eq!(
        error.to_string(),
        "failed to convert property Stamp.code from XML: bad stamp code `AB`"
    );

    let stamp = xml_model::from_str::<Stamp>(r#"<stamp><code value="ABC"/></stamp>"#).unwrap();
    assert_eq!(stamp.code, "ABC");
}

#[test]
fn xml_errors() {
    setup();
    // Parse errors are raised before any conversion
    let error = xml_model::from_str::<Book>("<book><name>A</book>").unwrap_err();
    assert!(matches!(error, Error::Xml(XmlError::Parse(_))));

    let error = xml_model::from_str::<Book>("<book><name>A</name>").unwrap_err();
    assert!(matches!(error, Error::Xml(XmlError::UnclosedElement(name)) if name == "book"));

    let error = xml_model::from_str::<Book>("").unwrap_err();
    assert!(matches!(error.root_cause(), Error::Xml(XmlError::MissingElement)));
}

#[test]
fn exhausted_pipeline() {
    let pipeline = Arc::new(Pipeline::from_iter([ModelFromXml::new(|ctx, next| {
        next.run(ctx)
    })]));
    let model = XmlModel::detached(ModelOptions::<Shelf>::new());
    let doc = xml_model::xml::parse("<shelf/>").unwrap();
    let context = xml_model::model::FromXmlContext {
        xml: &doc,
        model: &model,
    };
    assert!(matches!(
        resolve(&pipeline, &context),
        Err(Error::ExhaustedPipeline)
    ));
}
