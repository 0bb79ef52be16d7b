use serde::{Deserialize, Serialize};

/// Content types accepted for message attachments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MimeType {
    #[serde(rename = "image/bmp")]
    Bmp,
    #[serde(rename = "application/msword")]
    Doc,
    #[serde(rename = "application/vnd.ms-word.document.macroEnabled.12")]
    Docm,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.wordprocessingml.document")]
    Docx,
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "application/pdf")]
    Pdf,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "application/vnd.ms-powerpoint.slideshow.macroEnabled.12")]
    Ppsm,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.presentationml.slideshow")]
    Ppsx,
    #[serde(rename = "application/vnd.ms-powerpoint")]
    Ppt,
    #[serde(rename = "application/vnd.ms-powerpoint.presentation.macroEnabled.12")]
    Pptm,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.presentationml.presentation")]
    Pptx,
    #[serde(rename = "application/rtf")]
    Rtf,
    #[serde(rename = "image/tiff")]
    Tif,
    #[serde(rename = "text/plain")]
    Txt,
    #[serde(rename = "application/vnd.visio")]
    Vsd,
    #[serde(rename = "application/vnd.ms-excel")]
    Xls,
    #[serde(rename = "application/vnd.ms-excel.sheet.binary.macroEnabled.12")]
    Xlsb,
    #[serde(rename = "application/vnd.ms-excel.sheet.macroEnabled.12")]
    Xlsm,
    #[serde(rename = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet")]
    Xlsx,
}

impl MimeType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bmp => "image/bmp",
            Self::Doc => "application/msword",
            Self::Docm => "application/vnd.ms-word.document.macroEnabled.12",
            Self::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::Jpeg => "image/jpeg",
            Self::Pdf => "application/pdf",
            Self::Png => "image/png",
            Self::Ppsm => "application/vnd.ms-powerpoint.slideshow.macroEnabled.12",
            Self::Ppsx => {
                "application/vnd.openxmlformats-officedocument.presentationml.slideshow"
            }
            Self::Ppt => "application/vnd.ms-powerpoint",
            Self::Pptm => "application/vnd.ms-powerpoint.presentation.macroEnabled.12",
            Self::Pptx => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            Self::Rtf => "application/rtf",
            Self::Tif => "image/tiff",
            Self::Txt => "text/plain",
            Self::Vsd => "application/vnd.visio",
            Self::Xls => "application/vnd.ms-excel",
            Self::Xlsb => "application/vnd.ms-excel.sheet.binary.macroEnabled.12",
            Self::Xlsm => "application/vnd.ms-excel.sheet.macroEnabled.12",
            Self::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}
