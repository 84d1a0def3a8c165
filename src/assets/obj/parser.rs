use std::io::{BufRead, BufReader, Read};

use log::{debug, warn};

use super::builder::{FaceOutcome, ObjFaceIndex, ObjMeshBuilder};
use super::error::{ObjError, ObjResult, ParserError};

// parses wavefront obj (https://en.wikipedia.org/wiki/Wavefront_.obj_file)
// only the subset written by the encoder plus groups, uvs, normals and materials is understood
pub(crate) fn parse<R: Read>(reader: R, mut builder: ObjMeshBuilder) -> ObjResult<ObjMeshBuilder> {
    for (number, raw) in BufReader::new(reader).split(b'\n').enumerate() {
        let raw = raw?;
        // invalid utf-8 (latin-1 names and comments) is replaced instead of failing the file
        let decoded = String::from_utf8_lossy(&raw);
        let line = decoded.strip_suffix('\r').unwrap_or(&*decoded);
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        debug!("Parsing: \"{}\"", trimmed);

        let collapsed = collapse_whitespace(trimmed);
        let (token, value) = collapsed
            .split_once(' ')
            .unwrap_or((collapsed.as_str(), ""));

        parse_token(token, value, &mut builder).map_err(|source| ObjError::Parse {
            line: number + 1,
            content: line.to_owned(),
            source,
        })?;
    }

    Ok(builder)
}

fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_token(token: &str, value: &str, builder: &mut ObjMeshBuilder) -> Result<(), ParserError> {
    match token {
        // material library
        "mtllib" => debug!("Material libraries are not supported. Ignoring \"{}\"", value),
        // object name and group
        "o" | "g" => builder.set_object(value),
        // material
        "usemtl" => builder.set_material(value),
        // vertex
        "v" => builder.push_position(parse_vec3(value)?),
        // texture coordinates
        "vt" => builder.push_uv(parse_vec2(value)?),
        // vertex normals
        "vn" => builder.push_normal(parse_vec3(value)?),
        "f" => {
            if let FaceOutcome::Dropped(corners) = builder.push_face(&parse_face(value)?)? {
                warn!("Dropped face with {} corners, only triangles and quads are supported", corners);
            }
        }
        // parameter space vertices
        "vp" => warn!("Parameter space vertices not supported. Ignoring."),
        // smoothing groups
        "s" => debug!("Smoothing groups not supported. Ignoring."),
        "l" | "p" => warn!("Line and point elements not supported. Ignoring."),
        _ => warn!("Found unknown token: \"{}\"", token),
    };

    Ok(())
}

fn parse_vec3(value: &str) -> Result<[f32; 3], ParserError> {
    let numbers = parse_numbers(value, 3)?;
    Ok([numbers[0], numbers[1], numbers[2]])
}

fn parse_vec2(value: &str) -> Result<[f32; 2], ParserError> {
    let numbers = parse_numbers(value, 2)?;
    Ok([numbers[0], numbers[1]])
}

// parses at least `expected` numbers seperated by spaces, extra components (w, colors) are dropped
fn parse_numbers(value: &str, expected: usize) -> Result<Vec<f32>, ParserError> {
    let numbers = value
        .split_whitespace()
        .map(|x| x.parse())
        .collect::<Result<Vec<f32>, _>>()?;

    if numbers.len() < expected {
        return Err(ParserError::MissingComponents {
            expected,
            found: numbers.len(),
        });
    }

    Ok(numbers)
}

// parses face corners seperated by spaces
fn parse_face(value: &str) -> Result<Vec<ObjFaceIndex>, ParserError> {
    value.split_whitespace().map(parse_face_index).collect()
}

// parses a single face corner: `v`, `v/vt`, `v//vn` or `v/vt/vn`
fn parse_face_index(value: &str) -> Result<ObjFaceIndex, ParserError> {
    let parts: Vec<&str> = value.split('/').collect();

    let (vert, uv, normal) = match parts.as_slice() {
        [v] => (v, None, None),
        [v, vt] => (v, Some(vt), None),
        [v, "", vn] => (v, None, Some(vn)),
        [v, vt, vn] => (v, Some(vt), Some(vn)),
        _ => return Err(ParserError::ParseFace(value.to_owned())),
    };

    Ok(ObjFaceIndex {
        vert_i: parse_index(vert)?,
        uv_i: uv.map(|x| parse_index(x)).transpose()?,
        normal_i: normal.map(|x| parse_index(x)).transpose()?,
    })
}

// obj indices start at 1
fn parse_index(value: &str) -> Result<i64, ParserError> {
    value
        .parse::<i64>()?
        .checked_sub(1)
        .ok_or_else(|| ParserError::ParseFace(value.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assets::obj::SplitMode;

    fn builder() -> ObjMeshBuilder {
        ObjMeshBuilder::new(SplitMode::ByObject)
    }

    #[test]
    fn test_parse_token() -> Result<(), ParserError> {
        let mut builder = builder();

        parse_token("o", "foo bar", &mut builder)?;
        parse_token("v", "1 2 3", &mut builder)?;
        parse_token("v", "4 5 6", &mut builder)?;
        parse_token("v", "7 8 9 1", &mut builder)?;
        parse_token("f", "1 2 3", &mut builder)?;
        parse_token("mtllib", "scene.mtl", &mut builder)?;
        parse_token("s", "off", &mut builder)?;

        assert_eq!(builder.object_names(), &["foo bar".to_owned()]);
        assert_eq!(builder.unique_vertex_count(), 3);
        assert_eq!(builder.face_count(), 1);

        Ok(())
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_vec3("1 -2.5 3e1").unwrap(), [1.0, -2.5, 30.0]);
        assert_eq!(parse_vec2("0.25 0.75 0").unwrap(), [0.25, 0.75]);
        assert!(matches!(parse_vec3("1 2 x"), Err(ParserError::ParseFloat(_))));
        assert!(matches!(
            parse_vec3("1 2"),
            Err(ParserError::MissingComponents {
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            parse_vec2(""),
            Err(ParserError::MissingComponents {
                expected: 2,
                found: 0
            })
        ));
    }

    #[test]
    fn test_parse_face() -> Result<(), ParserError> {
        assert_eq!(
            parse_face("1 2/2 3/2/1 5//2")?,
            vec![
                ObjFaceIndex {
                    vert_i: 0,
                    ..ObjFaceIndex::default()
                },
                ObjFaceIndex {
                    vert_i: 1,
                    uv_i: Some(1),
                    ..ObjFaceIndex::default()
                },
                ObjFaceIndex {
                    vert_i: 2,
                    uv_i: Some(1),
                    normal_i: Some(0),
                },
                ObjFaceIndex {
                    vert_i: 4,
                    normal_i: Some(1),
                    ..ObjFaceIndex::default()
                }
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_face_index_errors() {
        assert!(matches!(parse_face_index("1/2/3/4"), Err(ParserError::ParseFace(_))));
        assert!(matches!(parse_face_index("a"), Err(ParserError::ParseInt(_))));
        assert!(matches!(parse_face_index("1/"), Err(ParserError::ParseInt(_))));
        assert!(matches!(parse_face_index("1//"), Err(ParserError::ParseInt(_))));
        assert!(matches!(parse_face_index("1.5"), Err(ParserError::ParseInt(_))));
        assert!(matches!(
            parse_face_index("-9223372036854775808"),
            Err(ParserError::ParseFace(_))
        ));
    }

    #[test]
    fn test_parse_extreme_index() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -9223372036854775808 2 3\n";
        match parse(text.as_bytes(), builder()) {
            Err(ObjError::Parse {
                line,
                source: ParserError::ParseFace(_),
                ..
            }) => assert_eq!(line, 4),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_parse_non_utf8() -> ObjResult<()> {
        let text = b"# caf\xe9 export\r\no r\xe9sidence\r\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\r\n";
        let builder = parse(&text[..], builder())?;

        assert_eq!(builder.object_names(), &["r\u{FFFD}sidence".to_owned()]);
        assert_eq!(builder.face_count(), 1);
        Ok(())
    }

    #[test]
    fn test_parse_reports_line() {
        let text = "v 0 0 0\n\n# comment\nv 1 nope 0\n";
        match parse(text.as_bytes(), builder()) {
            Err(ObjError::Parse { line, content, .. }) => {
                assert_eq!(line, 4);
                assert_eq!(content, "v 1 nope 0");
            }
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("f  1   2\t3"), "f 1 2 3");
        assert_eq!(collapse_whitespace("g   left  arm"), "g left arm");
    }
}
