//! 测试用的最小PDF构造器

use lopdf::{dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};

pub struct PdfBuilder {
    pages: Vec<String>,
    fonts: bool,
    image: bool,
    form_xobject: bool,
    form_fields: usize,
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            fonts: true,
            image: false,
            form_xobject: false,
            form_fields: 0,
        }
    }

    pub fn text_page(mut self, text: &str) -> Self {
        self.pages.push(format!("BT /F1 18 Tf 72 720 Td ({}) Tj ET", text));
        self
    }

    pub fn raw_page(mut self, content: &str) -> Self {
        self.pages.push(content.to_string());
        self
    }

    pub fn without_fonts(mut self) -> Self {
        self.fonts = false;
        self
    }

    pub fn with_image(mut self) -> Self {
        self.image = true;
        self
    }

    pub fn with_form_xobject(mut self) -> Self {
        self.form_xobject = true;
        self
    }

    pub fn with_form_fields(mut self, count: usize) -> Self {
        self.form_fields = count;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let mut resources = dictionary! {};
        if self.fonts {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            });
            resources.set("Font", dictionary! { "F1" => font_id });
        }

        let mut xobjects = dictionary! {};
        if self.image {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 2,
                    "Height" => 2,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0, 255, 255, 0],
            ));
            xobjects.set("Im1", image_id);
        }
        if self.form_xobject {
            let form_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Form",
                    "BBox" => vec![0.into(), 0.into(), 10.into(), 10.into()],
                },
                b"0 0 10 10 re f".to_vec(),
            ));
            xobjects.set("Fm1", form_id);
        }
        if !xobjects.is_empty() {
            resources.set("XObject", xobjects);
        }
        let resources_id = doc.add_object(resources);

        let mut kids: Vec<Object> = Vec::new();
        for content in &self.pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.clone().into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            });
            kids.push(page_id.into());
        }

        let page_count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count,
            }),
        );

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        };
        if self.form_fields > 0 {
            let fields: Vec<Object> = (0..self.form_fields)
                .map(|i| {
                    doc.add_object(dictionary! {
                        "FT" => "Tx",
                        "T" => Object::string_literal(format!("field{}", i)),
                        "Rect" => vec![0.into(), 0.into(), 100.into(), 20.into()],
                    })
                    .into()
                })
                .collect();
            catalog.set("AcroForm", dictionary! { "Fields" => fields });
        }
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", catalog_id);
        doc.compress();

        let mut out = Vec::new();
        doc.save_to(&mut out).unwrap();
        out
    }

    pub fn write_to(self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}
