//! STL 解析：二进制与 ASCII 两种格式
use log::debug;
use nalgebra::Vector3;
use nom::{
    IResult,
    bytes::complete::{tag, take},
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::{count, many0},
    number::complete::{float, le_f32, le_u16, le_u32},
    sequence::preceded,
};

/// 一个STL面片：文件中记录的法线和三个顶点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StlFacet {
    pub normal: Vector3<f32>,
    pub vertices: [Vector3<f32>; 3],
}

const BINARY_HEADER_LEN: usize = 80;
const BINARY_FACET_LEN: usize = 50;

/// 自动识别格式并解析
///
/// 以 "solid" 开头且能按 ASCII 解析的文件视为 ASCII，
/// 否则按二进制处理（部分导出工具会在二进制头部写入 "solid"）。
pub fn parse_stl(data: &[u8]) -> Result<Vec<StlFacet>, String> {
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            match parse_ascii_stl(text) {
                Ok(facets) => return Ok(facets),
                Err(e) => debug!("ASCII 解析失败，尝试二进制格式: {}", e),
            }
        }
    }
    parse_binary_stl(data)
}

/// 解析二进制STL：80字节头 + u32面片数 + 每面片50字节
pub fn parse_binary_stl(data: &[u8]) -> Result<Vec<StlFacet>, String> {
    if data.len() < BINARY_HEADER_LEN + 4 {
        return Err("文件太小，不是有效的STL".to_string());
    }

    let (rest, facet_count) = binary_header(data)
        .map_err(|e| format!("读取二进制STL头失败: {:?}", e))?;
    let facet_count = facet_count as usize;

    let expected = facet_count
        .checked_mul(BINARY_FACET_LEN)
        .ok_or_else(|| format!("面片数量 {} 过大", facet_count))?;
    if rest.len() < expected {
        return Err(format!(
            "二进制STL数据不完整: 声明 {} 个面片，需要 {} 字节，实际 {} 字节",
            facet_count,
            expected,
            rest.len()
        ));
    }

    let (_, facets) = count(binary_facet, facet_count)(rest)
        .map_err(|e| format!("解析二进制STL面片失败: {:?}", e))?;
    Ok(facets)
}

fn binary_header(input: &[u8]) -> IResult<&[u8], u32> {
    let (input, _) = take(BINARY_HEADER_LEN)(input)?;
    le_u32(input)
}

fn binary_vector3(input: &[u8]) -> IResult<&[u8], Vector3<f32>> {
    let (input, x) = le_f32(input)?;
    let (input, y) = le_f32(input)?;
    let (input, z) = le_f32(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

fn binary_facet(input: &[u8]) -> IResult<&[u8], StlFacet> {
    let (input, normal) = binary_vector3(input)?;
    let (input, a) = binary_vector3(input)?;
    let (input, b) = binary_vector3(input)?;
    let (input, c) = binary_vector3(input)?;
    // 属性字节数，忽略
    let (input, _) = le_u16(input)?;
    Ok((
        input,
        StlFacet {
            normal,
            vertices: [a, b, c],
        },
    ))
}

/// 解析ASCII STL
pub fn parse_ascii_stl(input: &str) -> Result<Vec<StlFacet>, String> {
    match ascii_solid(input) {
        Ok((_, facets)) => Ok(facets),
        Err(e) => Err(format!("解析ASCII STL失败: {:?}", e)),
    }
}

fn ascii_solid(input: &str) -> IResult<&str, Vec<StlFacet>> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    // 可选的实体名称
    let (input, _) = not_line_ending(input)?;
    let (input, facets) = many0(ascii_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;
    Ok((input, facets))
}

fn ascii_facet(input: &str) -> IResult<&str, StlFacet> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = ascii_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, a) = ascii_vertex(input)?;
    let (input, b) = ascii_vertex(input)?;
    let (input, c) = ascii_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((
        input,
        StlFacet {
            normal,
            vertices: [a, b, c],
        },
    ))
}

fn ascii_vertex(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    ascii_vector3(input)
}

fn ascii_vector3(input: &str) -> IResult<&str, Vector3<f32>> {
    let (input, _) = multispace1(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, Vector3::new(x, y, z)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TETRA_FACE: &str = "solid tetra
  facet normal 0 0 -1
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
  facet normal 0.0 -1.0e0 0.0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 0 1.5
    endloop
  endfacet
endsolid tetra
";

    fn binary_stl(facets: &[StlFacet], header: &[u8]) -> Vec<u8> {
        let mut data = vec![0u8; BINARY_HEADER_LEN];
        data[..header.len()].copy_from_slice(header);
        data.extend_from_slice(&(facets.len() as u32).to_le_bytes());
        for facet in facets {
            for v in std::iter::once(&facet.normal).chain(facet.vertices.iter()) {
                for c in v.iter() {
                    data.extend_from_slice(&c.to_le_bytes());
                }
            }
            data.extend_from_slice(&0u16.to_le_bytes());
        }
        data
    }

    fn sample_facet() -> StlFacet {
        StlFacet {
            normal: Vector3::new(0.0, 0.0, -1.0),
            vertices: [
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(0.0, 2.0, 0.0),
                Vector3::new(2.0, 0.0, 0.0),
            ],
        }
    }

    #[test]
    fn ascii_facets_are_parsed_in_order() {
        let facets = parse_ascii_stl(TETRA_FACE).unwrap();
        assert_eq!(facets.len(), 2);
        assert_eq!(facets[0].normal, Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(facets[0].vertices[1], Vector3::new(0.0, 1.0, 0.0));
        assert_eq!(facets[1].normal, Vector3::new(0.0, -1.0, 0.0));
        assert_eq!(facets[1].vertices[2], Vector3::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn detection_picks_ascii() {
        let facets = parse_stl(TETRA_FACE.as_bytes()).unwrap();
        assert_eq!(facets.len(), 2);
    }

    #[test]
    fn binary_facets_are_parsed() {
        let data = binary_stl(&[sample_facet(), sample_facet()], b"binary");
        let facets = parse_stl(&data).unwrap();
        assert_eq!(facets, vec![sample_facet(), sample_facet()]);
    }

    #[test]
    fn binary_header_starting_with_solid_falls_back() {
        let data = binary_stl(&[sample_facet()], b"solid exported by cad");
        let facets = parse_stl(&data).unwrap();
        assert_eq!(facets, vec![sample_facet()]);
    }

    #[test]
    fn truncated_binary_is_rejected() {
        let mut data = binary_stl(&[sample_facet()], b"");
        data.truncate(data.len() - 10);
        assert!(parse_binary_stl(&data).is_err());
        assert!(parse_binary_stl(&[0u8; 20]).is_err());
    }

    #[test]
    fn empty_binary_has_no_facets() {
        let data = binary_stl(&[], b"");
        assert!(parse_binary_stl(&data).unwrap().is_empty());
    }
}
