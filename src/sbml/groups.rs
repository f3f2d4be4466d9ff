//! Groups package output and model-level unit attributes.
//!
//! Groups and the model's unit attributes are written into the XML that
//! libsbml produces for the core document. The `<sbml>` element gains the
//! groups namespace, `<model>` gains its unit attributes, and the list of
//! groups is placed just before `</model>`:
//!
//! ```text
//! <groups:listOfGroups>
//!   <groups:group groups:id="grp_4_0_" groups:name="grp" groups:kind="collection">
//!     <annotation>...</annotation>
//!     <groups:listOfMembers>
//!       <groups:member groups:idRef="A_3_0_"/>
//!     </groups:listOfMembers>
//!   </groups:group>
//! </groups:listOfGroups>
//! ```

use std::io::Write;

use quick_xml::{
    encoding::EncodingError,
    events::{BytesEnd, BytesStart, BytesText, Event},
    Reader, Writer,
};

use crate::sbml::{
    annotations::{to_fragment, GroupAnnotation},
    error::SBMLError,
    units::{AREA, LENGTH, SUBSTANCE, TIME, VOLUME},
};

/// Namespace of the SBML Level 3 groups package.
pub const GROUPS_NS: &str = "http://www.sbml.org/sbml/level3/version1/groups/version1";

/// A collection of species and reactions placed together in the model tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub name: String,
    /// Ids of the member species and reactions, without repetition.
    pub members: Vec<String>,
    pub annotation: GroupAnnotation,
}

/// Model attributes that point at the base unit definitions.
const MODEL_UNITS: [(&str, &str); 6] = [
    ("substanceUnits", SUBSTANCE),
    ("timeUnits", TIME),
    ("volumeUnits", VOLUME),
    ("areaUnits", AREA),
    ("lengthUnits", LENGTH),
    ("extentUnits", SUBSTANCE),
];

/// Adds the groups and the model unit attributes to a core SBML document.
///
/// # Arguments
/// * `xml` - The document as written by libsbml
/// * `groups` - Groups to append to the model, possibly none
///
/// # Returns
/// The completed document. Without groups the namespace is not declared.
///
/// # Errors
/// * `SBMLError::XmlError` if `xml` is not well-formed
/// * `SBMLError::SerializeError` if a group annotation cannot be serialized
pub fn finish_document(xml: &str, groups: &[Group]) -> Result<String, SBMLError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());

    loop {
        match reader.read_event()? {
            Event::Start(start) if start.name().as_ref() == b"sbml" => {
                let mut start = start.into_owned();
                if !groups.is_empty() {
                    start.push_attribute(("xmlns:groups", GROUPS_NS));
                    start.push_attribute(("groups:required", "false"));
                }
                writer.write_event(Event::Start(start))?;
            }
            Event::Start(start) if start.name().as_ref() == b"model" => {
                let mut start = start.into_owned();
                for attribute in MODEL_UNITS {
                    start.push_attribute(attribute);
                }
                writer.write_event(Event::Start(start))?;
            }
            Event::End(end) if end.name().as_ref() == b"model" => {
                if !groups.is_empty() {
                    write_groups(&mut writer, groups)?;
                }
                writer.write_event(Event::End(end))?;
            }
            Event::Eof => break,
            event => writer.write_event(event)?,
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|err| quick_xml::Error::from(EncodingError::from(err.utf8_error())).into())
}

fn write_groups<W: Write>(writer: &mut Writer<W>, groups: &[Group]) -> Result<(), SBMLError> {
    writer.write_event(Event::Start(BytesStart::new("groups:listOfGroups")))?;

    for group in groups {
        let mut start = BytesStart::new("groups:group");
        start.push_attribute(("groups:id", group.id.as_str()));
        start.push_attribute(("groups:name", group.name.as_str()));
        start.push_attribute(("groups:kind", "collection"));
        writer.write_event(Event::Start(start))?;

        writer.write_event(Event::Start(BytesStart::new("annotation")))?;
        writer.write_event(Event::Text(BytesText::from_escaped(to_fragment(
            &group.annotation,
        )?)))?;
        writer.write_event(Event::End(BytesEnd::new("annotation")))?;

        writer.write_event(Event::Start(BytesStart::new("groups:listOfMembers")))?;
        for member in group.members.iter() {
            let mut element = BytesStart::new("groups:member");
            element.push_attribute(("groups:idRef", member.as_str()));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("groups:listOfMembers")))?;

        writer.write_event(Event::End(BytesEnd::new("groups:group")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("groups:listOfGroups")))?;
    Ok(())
}
